//! HTTP API: request dispatch, routing, and server wiring.

pub mod app;

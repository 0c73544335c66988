//! `stockroom-ledger` — delta-based stock mutation with an audit trail.
//!
//! The single choke point for quantity changes that must stay consistent
//! under concurrent callers. Every applied delta pairs 1:1 with exactly one
//! immutable [`StockMovement`].

pub mod ledger;
pub mod movement;

pub use ledger::{Demand, MOVEMENTS_COLLECTION, MOVEMENT_KEY, StockLedger};
pub use movement::{Direction, StockMovement};

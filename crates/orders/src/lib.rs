//! `stockroom-orders` — order placement and lifecycle.

pub mod order;
pub mod service;

pub use order::{Order, OrderLine, PLACED};
pub use service::{ORDERS_COLLECTION, ORDER_KEY, OrderService};

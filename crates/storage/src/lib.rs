//! `stockroom-storage` — key-value storage contract and in-memory backend.
//!
//! The rest of the system talks to storage exclusively through
//! [`KeyValueStore`]: named collections keyed by a declared primary-key
//! attribute, with conditional writes evaluated atomically. The conditional
//! update is the load-bearing concurrency primitive; nothing above this
//! crate is allowed to read-check-write a counter.

pub mod memory;
pub mod store;
pub mod value;

pub use memory::InMemoryStore;
pub use store::{Condition, KeyValueStore, StoreError, StoreResult, UpdateAction, UpdateSpec};
pub use value::{AttrValue, Record, json_to_attr, json_to_record, record_to_json};

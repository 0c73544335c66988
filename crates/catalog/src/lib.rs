//! `stockroom-catalog` — CRUD over stocked items.

pub mod item;

pub use item::{ITEMS_COLLECTION, ITEM_KEY, ItemCatalog, LIST_LIMIT};

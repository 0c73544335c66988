//! Order aggregate: a snapshot of requested line quantities plus a status.

use serde::{Deserialize, Serialize};

use stockroom_core::OrderId;
use stockroom_storage::{AttrValue, Record};

/// Status every order carries at placement. Patching may replace it with any
/// caller-supplied string; no transition machine is enforced.
pub const PLACED: &str = "PLACED";

/// One `{sku, qty}` entry within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub qty: i64,
}

/// A placed order. The `items` lines are the quantities as requested at
/// placement, never re-derived from current item state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: String,
    pub items: Vec<OrderLine>,
    pub created: i64,
}

impl Order {
    pub fn place(items: Vec<OrderLine>) -> Self {
        Self {
            id: OrderId::new(),
            status: PLACED.to_string(),
            items,
            created: chrono::Utc::now().timestamp(),
        }
    }

    pub fn to_record(&self) -> Record {
        let lines = self
            .items
            .iter()
            .map(|line| {
                let mut entry = Record::new();
                entry.insert("sku".into(), AttrValue::str(line.sku.clone()));
                entry.insert("qty".into(), AttrValue::int(line.qty));
                AttrValue::M(entry)
            })
            .collect();

        let mut record = Record::new();
        record.insert("id".into(), AttrValue::str(self.id.to_string()));
        record.insert("status".into(), AttrValue::str(self.status.clone()));
        record.insert("items".into(), AttrValue::L(lines));
        record.insert("created".into(), AttrValue::int(self.created));
        record
    }
}

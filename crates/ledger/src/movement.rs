//! Immutable stock movement records.

use serde::{Deserialize, Serialize};

use stockroom_core::MovementId;
use stockroom_storage::{AttrValue, Record};

/// Direction of a stock delta.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "IN",
            Self::Out => "OUT",
        }
    }

    /// Reason recorded when the caller supplies none.
    pub fn default_reason(&self) -> &'static str {
        match self {
            Self::In => "adjustment",
            Self::Out => "sale",
        }
    }
}

/// One audited stock quantity change. Written once, never mutated.
///
/// `ts` is second-granularity; ids are time-ordered (uuid v7) and break ties
/// between movements sharing a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: MovementId,
    pub sku: String,
    pub qty: i64,
    #[serde(rename = "type")]
    pub direction: Direction,
    pub ts: i64,
    pub reason: String,
}

impl StockMovement {
    pub fn new(sku: impl Into<String>, qty: i64, direction: Direction, reason: impl Into<String>) -> Self {
        Self {
            id: MovementId::new(),
            sku: sku.into(),
            qty,
            direction,
            ts: chrono::Utc::now().timestamp(),
            reason: reason.into(),
        }
    }

    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        record.insert("id".into(), AttrValue::str(self.id.to_string()));
        record.insert("sku".into(), AttrValue::str(self.sku.clone()));
        record.insert("qty".into(), AttrValue::int(self.qty));
        record.insert("type".into(), AttrValue::str(self.direction.as_str()));
        record.insert("ts".into(), AttrValue::int(self.ts));
        record.insert("reason".into(), AttrValue::str(self.reason.clone()));
        record
    }

    pub fn from_record(record: &Record) -> Option<Self> {
        let direction = match record.get("type")?.as_str()? {
            "IN" => Direction::In,
            "OUT" => Direction::Out,
            _ => return None,
        };
        Some(Self {
            id: record.get("id")?.as_str()?.parse().ok()?,
            sku: record.get("sku")?.as_str()?.to_string(),
            qty: record.get("qty")?.as_int()?,
            direction,
            ts: record.get("ts")?.as_int()?,
            reason: record.get("reason")?.as_str()?.to_string(),
        })
    }
}

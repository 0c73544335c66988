//! Order service.
//!
//! Placement validates the whole input before any storage touch, consumes
//! stock for every line in one transactional ledger call, and only then
//! persists the order aggregate. A rejected line therefore leaves no order
//! record and no stock change.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, DomainResult, coerce};
use stockroom_ledger::{Demand, StockLedger};
use stockroom_storage::{KeyValueStore, Record, UpdateSpec, json_to_attr};

use crate::order::{Order, OrderLine};

pub const ORDERS_COLLECTION: &str = "orders";
pub const ORDER_KEY: &str = "id";

const LIST_LIMIT: usize = 100;

/// Only `status` is writable through patch.
const PATCHABLE_FIELDS: [&str; 1] = ["status"];

pub struct OrderService {
    store: Arc<dyn KeyValueStore>,
    ledger: Arc<StockLedger>,
}

impl OrderService {
    pub fn new(store: Arc<dyn KeyValueStore>, ledger: Arc<StockLedger>) -> Self {
        Self { store, ledger }
    }

    /// Validate and place a multi-line order.
    pub fn create(&self, body: &JsonValue) -> DomainResult<Order> {
        let lines = parse_lines(body)?;

        let demands: Vec<Demand> = lines
            .iter()
            .map(|l| Demand { sku: l.sku.clone(), qty: l.qty })
            .collect();
        let movements = self.ledger.consume_lines(&demands, "sale")?;

        let order = Order::place(lines);
        self.store
            .put(ORDERS_COLLECTION, order.to_record(), false)
            .map_err(DomainError::storage)?;

        tracing::info!(order_id = %order.id, lines = movements.len(), "order placed");
        Ok(order)
    }

    pub fn get(&self, id: &str) -> DomainResult<Record> {
        self.store
            .get(ORDERS_COLLECTION, id)
            .map_err(DomainError::storage)?
            .ok_or_else(|| DomainError::not_found("Order not found"))
    }

    pub fn list(&self) -> DomainResult<Vec<Record>> {
        self.store
            .scan(ORDERS_COLLECTION, LIST_LIMIT)
            .map_err(DomainError::storage)
    }

    /// Restricted patch: `status` only, unconditional SET, full record back.
    pub fn patch(&self, id: &str, body: &JsonValue) -> DomainResult<Record> {
        let obj = body
            .as_object()
            .ok_or_else(|| DomainError::validation("Expected a JSON object"))?;

        let mut spec = UpdateSpec::new();
        for field in PATCHABLE_FIELDS {
            if let Some(value) = obj.get(field).filter(|v| !v.is_null()) {
                spec = spec.set(field, json_to_attr(value).map_err(DomainError::storage)?);
            }
        }
        if spec.is_empty() {
            return Err(DomainError::validation("Nothing to update"));
        }

        self.store
            .update(ORDERS_COLLECTION, id, spec, None)
            .map_err(DomainError::storage)
    }
}

/// Fail-fast validation pass over the whole input, before any mutation.
fn parse_lines(body: &JsonValue) -> DomainResult<Vec<OrderLine>> {
    let items = body
        .get("items")
        .and_then(JsonValue::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| DomainError::validation("No items in order"))?;

    let mut lines = Vec::with_capacity(items.len());
    for entry in items {
        let invalid = || DomainError::validation(format!("Invalid line: {entry}"));

        let sku = entry
            .get("sku")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(invalid)?;
        let qty = entry
            .get("qty")
            .and_then(|v| coerce::to_int("qty", v).ok())
            .filter(|qty| *qty > 0)
            .ok_or_else(invalid)?;

        lines.push(OrderLine { sku: sku.to_string(), qty });
    }
    Ok(lines)
}

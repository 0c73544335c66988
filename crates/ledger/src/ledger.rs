//! Stock ledger service.
//!
//! Quantity changes are single atomic conditional updates at the storage
//! layer; the ledger itself never reads a counter to decide whether a write
//! is allowed. A conditional failure is terminal for the request and is
//! surfaced to the caller, never retried or absorbed here.

use std::sync::Arc;

use rust_decimal::Decimal;

use stockroom_catalog::ITEMS_COLLECTION;
use stockroom_core::{DomainError, DomainResult};
use stockroom_storage::{AttrValue, Condition, KeyValueStore, Record, StoreError, UpdateSpec};

use crate::movement::{Direction, StockMovement};

pub const MOVEMENTS_COLLECTION: &str = "movements";
pub const MOVEMENT_KEY: &str = "id";

/// Cap on the movements returned for one sku, applied after the sku filter.
const MOVEMENT_SCAN_LIMIT: usize = 100;

/// One sku's demand within a multi-line consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demand {
    pub sku: String,
    pub qty: i64,
}

pub struct StockLedger {
    store: Arc<dyn KeyValueStore>,
}

impl StockLedger {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Apply one signed stock delta and append its movement.
    ///
    /// `In` increments unconditionally, initializing an absent counter to
    /// zero (and, like the original backend, upserting an absent sku).
    /// `Out` decrements under `exists AND stock >= qty` in one
    /// compare-and-swap. Returns the updated item attributes together with
    /// the movement that audited the change.
    pub fn apply_delta(
        &self,
        sku: &str,
        qty: i64,
        direction: Direction,
        reason: Option<&str>,
    ) -> DomainResult<(Record, StockMovement)> {
        validate_demand(sku, qty)?;

        let delta = Decimal::from(qty);
        let result = match direction {
            Direction::In => self.store.update(
                ITEMS_COLLECTION,
                sku,
                UpdateSpec::new().add("stock", delta),
                None,
            ),
            Direction::Out => self.store.update(
                ITEMS_COLLECTION,
                sku,
                UpdateSpec::new().add("stock", -delta),
                Some(Condition::exists_and_ge("stock", delta)),
            ),
        };

        let item = match result {
            Ok(item) => item,
            Err(StoreError::ConditionFailed { .. }) => return Err(self.classify_failure(sku)),
            Err(e) => return Err(DomainError::storage(e)),
        };

        let movement = self.append_movement(sku, qty, direction, reason)?;
        tracing::info!(%sku, qty, direction = direction.as_str(), "stock delta applied");
        Ok((item, movement))
    }

    /// Decrement every demand in one all-or-nothing transactional write,
    /// then append one OUT movement per line. A failing line leaves no
    /// partially-consumed stock and no movements.
    pub fn consume_lines(
        &self,
        demands: &[Demand],
        reason: &str,
    ) -> DomainResult<Vec<StockMovement>> {
        for demand in demands {
            validate_demand(&demand.sku, demand.qty)?;
        }

        let updates = demands
            .iter()
            .map(|d| {
                let delta = Decimal::from(d.qty);
                (
                    d.sku.clone(),
                    UpdateSpec::new().add("stock", -delta),
                    Some(Condition::exists_and_ge("stock", delta)),
                )
            })
            .collect();

        match self.store.transact_update(ITEMS_COLLECTION, updates) {
            Ok(_) => {}
            Err(StoreError::ConditionFailed { key, .. }) => {
                tracing::warn!(sku = %key, "stock consume rejected");
                return Err(self.classify_failure(&key));
            }
            Err(e) => return Err(DomainError::storage(e)),
        }

        let mut movements = Vec::with_capacity(demands.len());
        for demand in demands {
            movements.push(self.append_movement(&demand.sku, demand.qty, Direction::Out, Some(reason))?);
        }
        tracing::info!(lines = demands.len(), "stock consumed");
        Ok(movements)
    }

    /// Audit-trail read: movements for one sku, ordered by `(ts, id)`. The
    /// sku filter is pushed down to the store, so other skus' churn cannot
    /// crowd this sku out of the bounded result.
    pub fn movements_for_sku(&self, sku: &str) -> DomainResult<Vec<StockMovement>> {
        let rows = self
            .store
            .scan_where(
                MOVEMENTS_COLLECTION,
                "sku",
                &AttrValue::str(sku),
                MOVEMENT_SCAN_LIMIT,
            )
            .map_err(DomainError::storage)?;

        let mut movements: Vec<StockMovement> = rows
            .iter()
            .filter_map(StockMovement::from_record)
            .collect();
        movements.sort_by(|a, b| a.ts.cmp(&b.ts).then(a.id.cmp(&b.id)));
        Ok(movements)
    }

    fn append_movement(
        &self,
        sku: &str,
        qty: i64,
        direction: Direction,
        reason: Option<&str>,
    ) -> DomainResult<StockMovement> {
        let reason = reason.unwrap_or(direction.default_reason());
        let movement = StockMovement::new(sku, qty, direction, reason);
        self.store
            .put(MOVEMENTS_COLLECTION, movement.to_record(), false)
            .map_err(DomainError::storage)?;
        Ok(movement)
    }

    /// A failed conditional write means either the item is absent or its
    /// stock is short. One read after the fact tells them apart; the write
    /// path stays a single atomic step.
    fn classify_failure(&self, sku: &str) -> DomainError {
        match self.store.get(ITEMS_COLLECTION, sku) {
            Ok(None) => DomainError::not_found("Item not found"),
            Ok(Some(_)) => DomainError::insufficient_stock(sku),
            Err(e) => DomainError::storage(e),
        }
    }
}

fn validate_demand(sku: &str, qty: i64) -> DomainResult<()> {
    if sku.is_empty() || qty <= 0 {
        return Err(DomainError::validation("Invalid sku/qty"));
    }
    Ok(())
}

//! Item catalog service.
//!
//! Items are open records keyed by `sku`: the declared attributes (`name`,
//! `price`, `stock`) are validated and coerced, anything else the caller
//! sends on create is stored as-is. Stock mutation through this service is a
//! plain field overwrite; delta-based mutation under the non-negativity
//! invariant lives in the stock ledger, not here.

use std::sync::Arc;

use serde_json::Value as JsonValue;

use stockroom_core::coerce;
use stockroom_core::{DomainError, DomainResult};
use stockroom_storage::{AttrValue, KeyValueStore, Record, StoreError, UpdateSpec, json_to_attr};

pub const ITEMS_COLLECTION: &str = "items";
pub const ITEM_KEY: &str = "sku";

/// Bounded-scan cap shared by the list endpoints.
pub const LIST_LIMIT: usize = 100;

const REQUIRED_FIELDS: [&str; 4] = ["sku", "name", "price", "stock"];
const WRITABLE_FIELDS: [&str; 3] = ["name", "price", "stock"];

pub struct ItemCatalog {
    store: Arc<dyn KeyValueStore>,
}

impl ItemCatalog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Create a new item. Fails with `AlreadyExists` when the sku is taken;
    /// the existing record stays unmodified.
    pub fn create(&self, body: &JsonValue) -> DomainResult<Record> {
        let obj = as_object(body)?;
        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                return Err(DomainError::validation(format!("Missing field: {field}")));
            }
        }

        let sku = obj
            .get("sku")
            .and_then(JsonValue::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| DomainError::validation("Invalid sku"))?
            .to_string();

        let mut record = Record::new();
        for (k, v) in obj {
            if v.is_null() {
                continue;
            }
            record.insert(k.clone(), coerce_attr(k, v)?);
        }

        match self.store.put(ITEMS_COLLECTION, record.clone(), true) {
            Ok(()) => {
                tracing::info!(%sku, "item created");
                Ok(record)
            }
            Err(StoreError::ConditionFailed { .. }) => {
                Err(DomainError::already_exists("Item already exists"))
            }
            Err(e) => Err(DomainError::storage(e)),
        }
    }

    pub fn get(&self, sku: &str) -> DomainResult<Record> {
        self.store
            .get(ITEMS_COLLECTION, sku)
            .map_err(DomainError::storage)?
            .ok_or_else(|| DomainError::not_found("Item not found"))
    }

    pub fn list(&self) -> DomainResult<Vec<Record>> {
        self.store
            .scan(ITEMS_COLLECTION, LIST_LIMIT)
            .map_err(DomainError::storage)
    }

    /// Overwrite fields from the writable set; unknown fields are silently
    /// dropped. Does not check stock non-negativity (ledger path only).
    pub fn update(&self, sku: &str, body: &JsonValue) -> DomainResult<Record> {
        let obj = as_object(body)?;

        let mut spec = UpdateSpec::new();
        for field in WRITABLE_FIELDS {
            if let Some(value) = obj.get(field).filter(|v| !v.is_null()) {
                spec = spec.set(field, coerce_attr(field, value)?);
            }
        }
        if spec.is_empty() {
            return Err(DomainError::validation("Nothing to update"));
        }

        self.store
            .update(ITEMS_COLLECTION, sku, spec, None)
            .map_err(DomainError::storage)
    }

    /// Unconditional, idempotent delete. Deletion is not audited by a
    /// movement.
    pub fn delete(&self, sku: &str) -> DomainResult<()> {
        self.store
            .delete(ITEMS_COLLECTION, sku)
            .map_err(DomainError::storage)?;
        tracing::info!(%sku, "item deleted");
        Ok(())
    }
}

fn as_object(body: &JsonValue) -> DomainResult<&serde_json::Map<String, JsonValue>> {
    body.as_object()
        .ok_or_else(|| DomainError::validation("Expected a JSON object"))
}

/// Coerce the declared numeric fields into the exact decimal/integer domain;
/// pass everything else through untouched.
fn coerce_attr(field: &str, value: &JsonValue) -> DomainResult<AttrValue> {
    match field {
        "price" => Ok(AttrValue::N(coerce::to_decimal(field, value)?)),
        "stock" => Ok(AttrValue::int(coerce::to_int(field, value)?)),
        _ => json_to_attr(value).map_err(DomainError::storage),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;
    use serde_json::json;

    use stockroom_storage::InMemoryStore;

    use super::*;

    fn catalog() -> ItemCatalog {
        let store = InMemoryStore::with_collections(&[(ITEMS_COLLECTION, ITEM_KEY)]);
        ItemCatalog::new(Arc::new(store))
    }

    fn espresso() -> serde_json::Value {
        json!({"sku": "ESP-001", "name": "Espresso Beans", "price": "10.99", "stock": 20})
    }

    #[test]
    fn create_requires_each_field() {
        let catalog = catalog();
        for missing in ["sku", "name", "price", "stock"] {
            let mut body = espresso();
            body.as_object_mut().unwrap().remove(missing);
            let err = catalog.create(&body).unwrap_err();
            assert_eq!(
                err,
                DomainError::validation(format!("Missing field: {missing}"))
            );
        }
    }

    #[test]
    fn create_coerces_numbers_exactly() {
        let catalog = catalog();
        let record = catalog.create(&espresso()).unwrap();
        assert_eq!(
            record.get("price").unwrap().as_decimal().unwrap(),
            "10.99".parse::<Decimal>().unwrap()
        );
        assert_eq!(record.get("stock").unwrap().as_int(), Some(20));
    }

    #[test]
    fn create_preserves_undeclared_attributes() {
        let catalog = catalog();
        let mut body = espresso();
        body["origin"] = json!("Colombia");
        let record = catalog.create(&body).unwrap();
        assert_eq!(record.get("origin").unwrap().as_str(), Some("Colombia"));
    }

    #[test]
    fn create_rejects_duplicate_sku_and_keeps_original() {
        let catalog = catalog();
        catalog.create(&espresso()).unwrap();

        let mut second = espresso();
        second["stock"] = json!(999);
        let err = catalog.create(&second).unwrap_err();
        assert!(matches!(err, DomainError::AlreadyExists(_)));
        assert_eq!(
            catalog.get("ESP-001").unwrap().get("stock").unwrap().as_int(),
            Some(20)
        );
    }

    #[test]
    fn create_rejects_non_numeric_price() {
        let catalog = catalog();
        let mut body = espresso();
        body["price"] = json!("cheap");
        assert!(matches!(
            catalog.create(&body).unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[test]
    fn get_missing_is_not_found() {
        let err = catalog().get("NOPE").unwrap_err();
        assert_eq!(err, DomainError::not_found("Item not found"));
    }

    #[test]
    fn update_restricts_to_writable_fields() {
        let catalog = catalog();
        catalog.create(&espresso()).unwrap();

        // Unknown fields are dropped; the remaining set still applies.
        let record = catalog
            .update("ESP-001", &json!({"color": "red", "name": "House Blend"}))
            .unwrap();
        assert_eq!(record.get("name").unwrap().as_str(), Some("House Blend"));
        assert!(!record.contains_key("color"));
    }

    #[test]
    fn update_with_no_writable_fields_is_a_validation_error() {
        let catalog = catalog();
        catalog.create(&espresso()).unwrap();

        let err = catalog.update("ESP-001", &json!({"color": "red"})).unwrap_err();
        assert_eq!(err, DomainError::validation("Nothing to update"));
        // And no write happened.
        assert!(!catalog.get("ESP-001").unwrap().contains_key("color"));
    }

    #[test]
    fn update_overwrites_stock_without_ledger_checks() {
        let catalog = catalog();
        catalog.create(&espresso()).unwrap();
        let record = catalog.update("ESP-001", &json!({"stock": 0})).unwrap();
        assert_eq!(record.get("stock").unwrap().as_int(), Some(0));
    }

    #[test]
    fn delete_is_idempotent() {
        let catalog = catalog();
        catalog.create(&espresso()).unwrap();
        catalog.delete("ESP-001").unwrap();
        catalog.delete("ESP-001").unwrap();
        assert!(catalog.get("ESP-001").is_err());
    }

    #[test]
    fn list_is_bounded() {
        let catalog = catalog();
        for i in 0..(LIST_LIMIT + 20) {
            catalog
                .create(&json!({
                    "sku": format!("SKU-{i:03}"),
                    "name": "bulk",
                    "price": 1,
                    "stock": 1,
                }))
                .unwrap();
        }
        assert_eq!(catalog.list().unwrap().len(), LIST_LIMIT);
    }
}

//! In-memory storage backend.
//!
//! Intended for tests/dev. Not optimized for performance: rows live in a
//! `Vec` per collection (which also gives scans their insertion order) and
//! key lookup is linear. What it does guarantee is the contract's atomicity:
//! every conditional write holds the table write lock across both the
//! condition check and the mutation.

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;

use crate::store::{Condition, KeyValueStore, StoreError, StoreResult, UpdateAction, UpdateSpec};
use crate::value::{AttrValue, Record};

#[derive(Debug, Clone)]
struct Table {
    key_attr: String,
    rows: Vec<Record>,
}

impl Table {
    fn position(&self, key: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|r| r.get(&self.key_attr).and_then(AttrValue::as_str) == Some(key))
    }

    fn row(&self, key: &str) -> Option<&Record> {
        self.position(key).map(|i| &self.rows[i])
    }

    /// Evaluate `condition` and apply `spec` as one step against this table.
    fn apply(
        &mut self,
        collection: &str,
        key: &str,
        spec: &UpdateSpec,
        condition: Option<&Condition>,
    ) -> StoreResult<Record> {
        let pos = self.position(key);

        if let Some(cond) = condition {
            if !cond.eval(pos.map(|i| &self.rows[i])) {
                return Err(StoreError::ConditionFailed {
                    collection: collection.to_string(),
                    key: key.to_string(),
                });
            }
        }

        // Unguarded updates upsert a row holding only the key.
        let idx = match pos {
            Some(i) => i,
            None => {
                let mut row = Record::new();
                row.insert(self.key_attr.clone(), AttrValue::str(key));
                self.rows.push(row);
                self.rows.len() - 1
            }
        };

        let row = &mut self.rows[idx];
        for (attr, action) in &spec.actions {
            match action {
                UpdateAction::Set(value) => {
                    row.insert(attr.clone(), value.clone());
                }
                UpdateAction::Add(delta) => {
                    let current = match row.get(attr) {
                        Some(AttrValue::N(d)) => *d,
                        Some(_) => {
                            return Err(StoreError::Backend(format!(
                                "attribute '{attr}' is not numeric"
                            )));
                        }
                        None => Decimal::ZERO,
                    };
                    row.insert(attr.clone(), AttrValue::N(current + *delta));
                }
            }
        }

        Ok(row.clone())
    }
}

/// In-memory key-value store with atomic conditional updates.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the collections and their primary-key attributes up front.
    pub fn with_collections(collections: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write().unwrap_or_else(|e| e.into_inner());
            for (name, key_attr) in collections {
                tables.insert(
                    name.to_string(),
                    Table {
                        key_attr: key_attr.to_string(),
                        rows: Vec::new(),
                    },
                );
            }
        }
        store
    }
}

fn poisoned(_: impl core::fmt::Debug) -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

fn unknown(collection: &str) -> StoreError {
    StoreError::UnknownCollection(collection.to_string())
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Record>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let table = tables.get(collection).ok_or_else(|| unknown(collection))?;
        Ok(table.row(key).cloned())
    }

    fn put(&self, collection: &str, record: Record, unique: bool) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.get_mut(collection).ok_or_else(|| unknown(collection))?;

        let key = record
            .get(&table.key_attr)
            .and_then(AttrValue::as_str)
            .ok_or_else(|| StoreError::MissingKey(table.key_attr.clone()))?
            .to_string();

        match table.position(&key) {
            Some(_) if unique => Err(StoreError::ConditionFailed {
                collection: collection.to_string(),
                key,
            }),
            Some(i) => {
                table.rows[i] = record;
                Ok(())
            }
            None => {
                table.rows.push(record);
                Ok(())
            }
        }
    }

    fn update(
        &self,
        collection: &str,
        key: &str,
        spec: UpdateSpec,
        condition: Option<Condition>,
    ) -> StoreResult<Record> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.get_mut(collection).ok_or_else(|| unknown(collection))?;
        table.apply(collection, key, &spec, condition.as_ref())
    }

    fn transact_update(
        &self,
        collection: &str,
        updates: Vec<(String, UpdateSpec, Option<Condition>)>,
    ) -> StoreResult<Vec<Record>> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.get_mut(collection).ok_or_else(|| unknown(collection))?;

        // Stage on a copy so a failing condition part-way through leaves the
        // live table untouched. Conditions see the staged state, so duplicate
        // keys within one batch cannot oversubscribe a counter.
        let mut staged = table.clone();
        let mut results = Vec::with_capacity(updates.len());
        for (key, spec, condition) in &updates {
            results.push(staged.apply(collection, key, spec, condition.as_ref())?);
        }

        *table = staged;
        Ok(results)
    }

    fn scan(&self, collection: &str, limit: usize) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let table = tables.get(collection).ok_or_else(|| unknown(collection))?;
        Ok(table.rows.iter().take(limit).cloned().collect())
    }

    fn scan_where(
        &self,
        collection: &str,
        attr: &str,
        value: &AttrValue,
        limit: usize,
    ) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().map_err(poisoned)?;
        let table = tables.get(collection).ok_or_else(|| unknown(collection))?;
        Ok(table
            .rows
            .iter()
            .filter(|r| r.get(attr) == Some(value))
            .take(limit)
            .cloned()
            .collect())
    }

    fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.get_mut(collection).ok_or_else(|| unknown(collection))?;
        if let Some(i) = table.position(key) {
            table.rows.remove(i);
        }
        Ok(())
    }
}

//! Storage contract: named collections with atomic conditional writes.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::value::{AttrValue, Record};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage-layer error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The named collection was never declared.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// A put was attempted with the collection's key attribute missing or
    /// non-string.
    #[error("record is missing key attribute '{0}'")]
    MissingKey(String),

    /// A conditional write (unique put, guarded update) found its condition
    /// false at write time. Upper layers classify this into a business error.
    #[error("conditional check failed on '{collection}' key '{key}'")]
    ConditionFailed { collection: String, key: String },

    /// The backend itself failed; treated as retryable by the caller.
    #[error("backend failure: {0}")]
    Backend(String),
}

/// Predicate evaluated against the current stored attributes, atomically with
/// the write it guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The record exists (the original's `attribute_exists(<key>)`).
    KeyExists,
    /// Named numeric attribute exists and is `>=` the given value.
    Ge(String, Decimal),
    And(Box<Condition>, Box<Condition>),
}

impl Condition {
    /// `attribute_exists(key) AND attr >= value` — the guard used for every
    /// stock decrement.
    pub fn exists_and_ge(attr: impl Into<String>, value: Decimal) -> Self {
        Self::And(Box::new(Self::KeyExists), Box::new(Self::Ge(attr.into(), value)))
    }

    /// Evaluate against a record, `None` meaning "no such record".
    pub fn eval(&self, record: Option<&Record>) -> bool {
        match self {
            Self::KeyExists => record.is_some(),
            Self::Ge(attr, value) => record
                .and_then(|r| r.get(attr))
                .and_then(AttrValue::as_decimal)
                .is_some_and(|current| current >= *value),
            Self::And(a, b) => a.eval(record) && b.eval(record),
        }
    }
}

/// One mutation applied to a single attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Overwrite the attribute (`SET attr = :v`).
    Set(AttrValue),
    /// Numeric delta, initializing an absent attribute to zero first
    /// (`SET attr = if_not_exists(attr, 0) + :delta`).
    Add(Decimal),
}

/// An ordered set of attribute mutations applied as one write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSpec {
    pub actions: Vec<(String, UpdateAction)>,
}

impl UpdateSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, attr: impl Into<String>, value: AttrValue) -> Self {
        self.actions.push((attr.into(), UpdateAction::Set(value)));
        self
    }

    pub fn add(mut self, attr: impl Into<String>, delta: Decimal) -> Self {
        self.actions.push((attr.into(), UpdateAction::Add(delta)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Key-value storage over named collections.
///
/// `update` MUST evaluate its condition and apply its mutations in a single
/// atomic step; separate read-then-write would reintroduce the race the
/// stock non-negativity invariant relies on this trait to prevent.
/// Implementations are shared by all requests behind one long-lived handle.
pub trait KeyValueStore: Send + Sync {
    /// Point lookup by primary key.
    fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Record>>;

    /// Insert or overwrite a whole record. With `unique`, the put fails with
    /// `ConditionFailed` when the key already exists and leaves the existing
    /// record unmodified.
    fn put(&self, collection: &str, record: Record, unique: bool) -> StoreResult<()>;

    /// Apply an update (field sets and/or numeric deltas), optionally guarded
    /// by a condition. Returns the full post-update record. An unguarded
    /// update against an absent key upserts a record holding only the key.
    fn update(
        &self,
        collection: &str,
        key: &str,
        spec: UpdateSpec,
        condition: Option<Condition>,
    ) -> StoreResult<Record>;

    /// Apply several guarded updates in one collection as an all-or-nothing
    /// batch: if any condition fails, no mutation is applied.
    fn transact_update(
        &self,
        collection: &str,
        updates: Vec<(String, UpdateSpec, Option<Condition>)>,
    ) -> StoreResult<Vec<Record>>;

    /// Bounded scan in storage (insertion) order.
    fn scan(&self, collection: &str, limit: usize) -> StoreResult<Vec<Record>>;

    /// Bounded scan returning only rows whose `attr` equals `value`. The
    /// filter applies before the limit, so the bound caps the matching rows
    /// rather than the rows inspected.
    fn scan_where(
        &self,
        collection: &str,
        attr: &str,
        value: &AttrValue,
        limit: usize,
    ) -> StoreResult<Vec<Record>>;

    /// Unconditional delete; succeeds if the key is already absent.
    fn delete(&self, collection: &str, key: &str) -> StoreResult<()>;
}

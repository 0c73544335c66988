//! Attribute-value data model for stored records.
//!
//! Records are open maps: callers may persist attributes the domain layer
//! never declared. All numbers are exact decimals; binary floats only appear
//! at the JSON boundary, and only for non-integral values.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

use crate::store::{StoreError, StoreResult};

/// A single stored attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    S(String),
    N(Decimal),
    Bool(bool),
    L(Vec<AttrValue>),
    M(Record),
}

/// A stored record: attribute name → value, open-ended.
pub type Record = BTreeMap<String, AttrValue>;

impl AttrValue {
    pub fn str(s: impl Into<String>) -> Self {
        Self::S(s.into())
    }

    pub fn int(n: i64) -> Self {
        Self::N(Decimal::from(n))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Self::N(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        self.as_decimal().and_then(|d| d.to_i64())
    }
}

/// Convert a JSON value into an attribute value.
///
/// Numbers are parsed from their literal text (serde_json's
/// `arbitrary_precision` keeps it available), so `10.99` arrives exact.
pub fn json_to_attr(value: &JsonValue) -> StoreResult<AttrValue> {
    match value {
        JsonValue::String(s) => Ok(AttrValue::S(s.clone())),
        JsonValue::Number(n) => {
            let text = n.to_string();
            let dec = text
                .parse::<Decimal>()
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| StoreError::Backend(format!("unrepresentable number: {text}")))?;
            Ok(AttrValue::N(dec))
        }
        JsonValue::Bool(b) => Ok(AttrValue::Bool(*b)),
        JsonValue::Array(items) => Ok(AttrValue::L(
            items.iter().map(json_to_attr).collect::<StoreResult<_>>()?,
        )),
        JsonValue::Object(map) => Ok(AttrValue::M(json_to_record_map(map)?)),
        JsonValue::Null => Err(StoreError::Backend("null attribute values are not stored".into())),
    }
}

/// Convert a JSON object into a record. Null-valued attributes are dropped.
pub fn json_to_record(value: &JsonValue) -> StoreResult<Record> {
    match value {
        JsonValue::Object(map) => json_to_record_map(map),
        other => Err(StoreError::Backend(format!("expected JSON object, got {other}"))),
    }
}

fn json_to_record_map(map: &JsonMap<String, JsonValue>) -> StoreResult<Record> {
    let mut record = Record::new();
    for (k, v) in map {
        if v.is_null() {
            continue;
        }
        record.insert(k.clone(), json_to_attr(v)?);
    }
    Ok(record)
}

/// Render an attribute value as client-facing JSON.
///
/// Integral decimals render as JSON integers, non-integral as floats, so
/// clients see `20` and `10.99` rather than decimal strings.
pub fn attr_to_json(value: &AttrValue) -> JsonValue {
    match value {
        AttrValue::S(s) => JsonValue::String(s.clone()),
        AttrValue::N(d) => decimal_to_json(*d),
        AttrValue::Bool(b) => JsonValue::Bool(*b),
        AttrValue::L(items) => JsonValue::Array(items.iter().map(attr_to_json).collect()),
        AttrValue::M(record) => record_to_json(record),
    }
}

pub fn record_to_json(record: &Record) -> JsonValue {
    let mut map = JsonMap::new();
    for (k, v) in record {
        map.insert(k.clone(), attr_to_json(v));
    }
    JsonValue::Object(map)
}

fn decimal_to_json(d: Decimal) -> JsonValue {
    if d.fract() == Decimal::ZERO {
        if let Some(i) = d.to_i64() {
            return JsonValue::Number(JsonNumber::from(i));
        }
    }
    match d.to_f64().and_then(JsonNumber::from_f64) {
        Some(n) => JsonValue::Number(n),
        // Out-of-range decimals fall back to their textual form.
        None => JsonValue::String(d.to_string()),
    }
}

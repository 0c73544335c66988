//! Validating numeric coercion for caller-supplied JSON values.
//!
//! Price and quantity fields arrive as JSON numbers or numeric strings and
//! must land in an exact decimal/integer domain, never a binary float. A
//! value that does not parse is a `Validation` failure, not a silent cast.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value as JsonValue;

use crate::error::{DomainError, DomainResult};

/// Parse a JSON value into an exact decimal.
///
/// Accepts numbers and numeric strings. Relies on serde_json's
/// `arbitrary_precision` representation so the literal reaches the parser
/// without an f64 round-trip.
pub fn to_decimal(field: &str, value: &JsonValue) -> DomainResult<Decimal> {
    let text = match value {
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => s.trim().to_string(),
        _ => return Err(invalid(field, value)),
    };
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| invalid(field, value))
}

/// Parse a JSON value into an integer, rejecting fractional input.
pub fn to_int(field: &str, value: &JsonValue) -> DomainResult<i64> {
    let dec = to_decimal(field, value)?;
    if dec.fract() != Decimal::ZERO {
        return Err(invalid(field, value));
    }
    dec.to_i64().ok_or_else(|| invalid(field, value))
}

fn invalid(field: &str, value: &JsonValue) -> DomainError {
    DomainError::validation(format!("Invalid numeric value for {field}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decimal_from_number_is_exact() {
        let d = to_decimal("price", &json!(10.99)).unwrap();
        assert_eq!(d, "10.99".parse::<Decimal>().unwrap());
    }

    #[test]
    fn decimal_from_string() {
        let d = to_decimal("price", &json!(" 3.50 ")).unwrap();
        assert_eq!(d, "3.50".parse::<Decimal>().unwrap());
    }

    #[test]
    fn decimal_rejects_non_numeric() {
        assert!(matches!(
            to_decimal("price", &json!("cheap")),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            to_decimal("price", &json!({"amount": 1})),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn int_accepts_integral_forms() {
        assert_eq!(to_int("stock", &json!(20)).unwrap(), 20);
        assert_eq!(to_int("stock", &json!("20")).unwrap(), 20);
        assert_eq!(to_int("stock", &json!(20.0)).unwrap(), 20);
    }

    #[test]
    fn int_rejects_fractional() {
        assert!(matches!(
            to_int("stock", &json!(5.5)),
            Err(DomainError::Validation(_))
        ));
    }
}

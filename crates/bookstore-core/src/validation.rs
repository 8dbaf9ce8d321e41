//! # Validation Module
//!
//! Field extraction and check-constraint validation for bookstore entities.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Fixture decoding (serde_json)                                │
//! │  └── Record shape: model / pk / fields                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Required fields present, JSON types correct                       │
//! │  └── Check constraints (count >= 0, price >= 0, count > 0, lengths)    │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints (parent must already exist)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::money::Money;
use crate::MAX_NAME_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Field mapping of a fixture record.
pub type Fields = Map<String, Value>;

// =============================================================================
// Field Extraction
// =============================================================================

/// Reads a required string field.
pub fn required_str<'a>(fields: &'a Fields, field: &str) -> ValidationResult<&'a str> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ValidationError::required(field)),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ValidationError::invalid_type(field, "a string")),
    }
}

/// Reads a required integer field.
///
/// Integers written as JSON strings (`"42"`) are accepted too.
pub fn required_i64(fields: &Fields, field: &str) -> ValidationResult<i64> {
    optional_i64(fields, field)?.ok_or_else(|| ValidationError::required(field))
}

/// Reads an optional integer field. `null` counts as absent.
pub fn optional_i64(fields: &Fields, field: &str) -> ValidationResult<Option<i64>> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ValidationError::invalid_type(field, "an integer")),
        Some(Value::String(s)) => s
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ValidationError::invalid_type(field, "an integer")),
        Some(_) => Err(ValidationError::invalid_type(field, "an integer")),
    }
}

/// Reads a required price, given as a decimal string or a JSON number.
pub fn required_price(fields: &Fields, field: &str) -> ValidationResult<Money> {
    match fields.get(field) {
        None | Some(Value::Null) => Err(ValidationError::required(field)),
        Some(Value::String(s)) => Money::parse(s),
        Some(Value::Number(n)) => Money::parse(&n.to_string()),
        Some(_) => Err(ValidationError::invalid_type(field, "a decimal number")),
    }
}

/// Reads a required timestamp.
///
/// ## Accepted Formats
/// - RFC 3339 (`2018-10-25T09:45:24.552Z`, `2018-10-25T11:45:24+02:00`)
/// - Naive date-time, taken as UTC (`2018-10-25 09:45:24`, `2018-10-25T09:45:24.5`)
/// - Bare date, midnight UTC (`2018-10-25`)
pub fn required_datetime(fields: &Fields, field: &str) -> ValidationResult<DateTime<Utc>> {
    let raw = required_str(fields, field)?;
    parse_datetime(raw).ok_or_else(|| {
        ValidationError::invalid_format(field, format!("'{}' is not a date/time", raw))
    })
}

fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Fails on the first field not listed in `allowed`.
pub fn reject_unknown_fields(
    fields: &Fields,
    entity: &str,
    allowed: &[&str],
) -> ValidationResult<()> {
    match fields.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(ValidationError::UnknownField {
            entity: entity.to_string(),
            field: key.clone(),
        }),
        None => Ok(()),
    }
}

// =============================================================================
// Check Constraints
// =============================================================================

/// Validates a name or title.
///
/// ## Rules
/// - Must not be blank
/// - At most [`MAX_NAME_LEN`] characters
///
/// ## Example
/// ```rust
/// use bookstore_core::validation::validate_name;
///
/// assert!(validate_name("name", "O'Reilly").is_ok());
/// assert!(validate_name("name", "   ").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a stock count (`count >= 0`).
pub fn validate_stock_count(count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::OutOfRange {
            field: "count".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a sale count (`count > 0`).
pub fn validate_sale_count(count: i64) -> ValidationResult<()> {
    if count <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "count".to_string(),
        });
    }

    Ok(())
}

/// Validates a sale price (`price >= 0`).
///
/// ## Example
/// ```rust
/// use bookstore_core::money::Money;
/// use bookstore_core::validation::validate_price;
///
/// assert!(validate_price(Money::from_cents(0)).is_ok());
/// assert!(validate_price(Money::from_cents(-1)).is_err());
/// ```
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: crate::MAX_PRICE_CENTS / 100,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_required_str() {
        let f = fields(json!({"name": "Pearson", "n": 3, "empty": null}));
        assert_eq!(required_str(&f, "name").unwrap(), "Pearson");
        assert_eq!(
            required_str(&f, "missing"),
            Err(ValidationError::required("missing"))
        );
        assert_eq!(
            required_str(&f, "empty"),
            Err(ValidationError::required("empty"))
        );
        assert!(matches!(
            required_str(&f, "n"),
            Err(ValidationError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_integers() {
        let f = fields(json!({"a": 7, "b": "8", "c": 1.5, "d": "x", "e": null}));
        assert_eq!(required_i64(&f, "a").unwrap(), 7);
        assert_eq!(required_i64(&f, "b").unwrap(), 8);
        assert!(required_i64(&f, "c").is_err());
        assert!(required_i64(&f, "d").is_err());
        assert_eq!(optional_i64(&f, "e").unwrap(), None);
        assert_eq!(optional_i64(&f, "zzz").unwrap(), None);
    }

    #[test]
    fn test_price_from_string_and_number() {
        let f = fields(json!({"s": "50.05", "n": 9.99, "i": 16, "b": true}));
        assert_eq!(required_price(&f, "s").unwrap().cents(), 5005);
        assert_eq!(required_price(&f, "n").unwrap().cents(), 999);
        assert_eq!(required_price(&f, "i").unwrap().cents(), 1600);
        assert!(required_price(&f, "b").is_err());
        assert!(required_price(&f, "missing").is_err());
    }

    #[test]
    fn test_datetime_formats() {
        let f = fields(json!({
            "rfc": "2018-10-25T09:45:24.552Z",
            "offset": "2018-10-25T11:45:24+02:00",
            "naive": "2018-10-25 09:45:24",
            "date": "2018-10-25",
            "bad": "25/10/2018",
        }));

        let rfc = required_datetime(&f, "rfc").unwrap();
        assert_eq!((rfc.year(), rfc.month(), rfc.day()), (2018, 10, 25));
        assert_eq!(rfc.hour(), 9);

        let offset = required_datetime(&f, "offset").unwrap();
        assert_eq!(offset.hour(), 9);

        assert_eq!(required_datetime(&f, "naive").unwrap().minute(), 45);
        assert_eq!(required_datetime(&f, "date").unwrap().hour(), 0);
        assert!(matches!(
            required_datetime(&f, "bad"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_reject_unknown_fields() {
        let f = fields(json!({"title": "X", "isbn": "123"}));
        assert_eq!(
            reject_unknown_fields(&f, "book", &["title", "id_publisher"]),
            Err(ValidationError::UnknownField {
                entity: "book".to_string(),
                field: "isbn".to_string(),
            })
        );
        assert!(reject_unknown_fields(&f, "book", &["title", "isbn"]).is_ok());
    }

    #[test]
    fn test_check_constraints() {
        assert!(validate_name("name", "Pearson").is_ok());
        assert!(validate_name("name", "").is_err());
        assert!(validate_name("name", &"A".repeat(100)).is_ok());
        assert!(validate_name("name", &"A".repeat(101)).is_err());

        assert!(validate_stock_count(0).is_ok());
        assert!(validate_stock_count(-1).is_err());

        assert!(validate_sale_count(1).is_ok());
        assert!(validate_sale_count(0).is_err());

        assert!(validate_price(Money::from_cents(0)).is_ok());
        assert!(validate_price(Money::from_cents(-5)).is_err());
    }
}

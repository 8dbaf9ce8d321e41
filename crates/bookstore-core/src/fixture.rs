//! # Fixture Records
//!
//! Tagged records used for bulk import, and their conversion into typed
//! entities.
//!
//! ## Record Shape
//! ```text
//! {
//!   "model": "book",                       ← kind label
//!   "pk": 1,                               ← explicit identifier
//!   "fields": {                            ← field name → value
//!     "title": "Programming Python, 4th Edition",
//!     "id_publisher": 1
//!   }
//! }
//! ```
//!
//! ## Kind Dispatch
//! ```text
//! label ──► EntityKind::from_label ──┬── publisher ──► Entity::Publisher
//!                                    ├── shop      ──► Entity::Shop
//!                                    ├── book      ──► Entity::Book
//!                                    ├── stock     ──► Entity::Stock
//!                                    ├── sale      ──► Entity::Sale
//!                                    └── (other)   ──► CoreError::UnknownKind
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Book, EntityKind, Publisher, Sale, Shop, Stock};
use crate::validation::{
    optional_i64, reject_unknown_fields, required_datetime, required_i64, required_price,
    required_str, validate_name, validate_price, validate_sale_count, validate_stock_count,
    Fields, ValidationResult,
};

// =============================================================================
// Fixture Record
// =============================================================================

/// One tagged record of a bulk-import source.
///
/// The parts are kept as raw JSON so that a badly shaped record (no `model`,
/// a string `pk`, `fields` that isn't an object) is reported by
/// [`FixtureRecord::to_entity`] instead of failing the whole source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    /// Kind label (`publisher`, `shop`, `book`, `stock`, `sale`).
    #[serde(default)]
    pub model: Value,

    /// Identifier assigned to the entity.
    #[serde(default)]
    pub pk: Value,

    /// Field values keyed by entity field name.
    #[serde(default)]
    pub fields: Value,
}

impl FixtureRecord {
    /// Creates a record from its parts.
    pub fn new(model: impl Into<String>, pk: i64, fields: Fields) -> Self {
        FixtureRecord {
            model: Value::String(model.into()),
            pk: Value::from(pk),
            fields: Value::Object(fields),
        }
    }

    /// Kind label for reporting; whatever was given when it isn't a string.
    pub fn label(&self) -> String {
        match &self.model {
            Value::String(label) => label.clone(),
            Value::Null => "?".to_string(),
            other => other.to_string(),
        }
    }

    /// Identifier, when it is an integer.
    pub fn pk(&self) -> Option<i64> {
        self.pk.as_i64()
    }

    /// Resolves the kind label.
    pub fn kind(&self) -> CoreResult<EntityKind> {
        match &self.model {
            Value::String(label) => label.parse(),
            Value::Null => Err(ValidationError::required("model").into()),
            _ => Err(ValidationError::invalid_type("model", "a string").into()),
        }
    }

    /// Builds the typed entity this record describes.
    ///
    /// Foreign keys are only type-checked here; whether the parent exists is
    /// the database's call.
    pub fn to_entity(&self) -> CoreResult<Entity> {
        let kind = self.kind()?;

        let pk = match &self.pk {
            Value::Null => return Err(ValidationError::required("pk").into()),
            value => value
                .as_i64()
                .ok_or_else(|| ValidationError::invalid_type("pk", "an integer"))?,
        };

        let empty = Fields::new();
        let fields = match &self.fields {
            Value::Null => &empty,
            Value::Object(map) => map,
            _ => return Err(ValidationError::invalid_type("fields", "an object").into()),
        };

        Ok(Entity::from_fields(kind, pk, fields)?)
    }
}

impl From<Value> for FixtureRecord {
    /// Takes `model`, `pk` and `fields` from an object. Anything that isn't an
    /// object becomes a record with no model.
    fn from(value: Value) -> Self {
        match value {
            Value::Object(mut map) => FixtureRecord {
                model: map.remove("model").unwrap_or_default(),
                pk: map.remove("pk").unwrap_or_default(),
                fields: map.remove("fields").unwrap_or_default(),
            },
            _ => FixtureRecord::default(),
        }
    }
}

/// Parses a JSON array of fixture records.
///
/// Only the array itself has to be well formed; each element is checked
/// later by [`FixtureRecord::to_entity`].
///
/// ## Example
/// ```rust
/// use bookstore_core::fixture::parse_records;
///
/// let records = parse_records(r#"[
///     {"model": "publisher", "pk": 1, "fields": {"name": "O'Reilly"}},
///     {"pk": 2, "fields": {"name": "No model"}}
/// ]"#).unwrap();
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[0].label(), "publisher");
/// assert!(records[1].to_entity().is_err());
/// ```
pub fn parse_records(json: &str) -> Result<Vec<FixtureRecord>, serde_json::Error> {
    let values: Vec<Value> = serde_json::from_str(json)?;
    Ok(values.into_iter().map(FixtureRecord::from).collect())
}

// =============================================================================
// Entity
// =============================================================================

/// Any one of the five entities, ready to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Entity {
    Publisher(Publisher),
    Shop(Shop),
    Book(Book),
    Stock(Stock),
    Sale(Sale),
}

impl Entity {
    /// Constructs an entity of `kind` from a field mapping.
    pub fn from_fields(kind: EntityKind, id: i64, fields: &Fields) -> ValidationResult<Entity> {
        reject_unknown_fields(fields, kind.label(), kind.field_names())?;

        let entity = match kind {
            EntityKind::Publisher => {
                let name = required_str(fields, "name")?;
                validate_name("name", name)?;
                Entity::Publisher(Publisher {
                    id,
                    name: name.to_string(),
                })
            }
            EntityKind::Shop => {
                let name = required_str(fields, "name")?;
                validate_name("name", name)?;
                Entity::Shop(Shop {
                    id,
                    name: name.to_string(),
                })
            }
            EntityKind::Book => {
                let title = required_str(fields, "title")?;
                validate_name("title", title)?;
                Entity::Book(Book {
                    id,
                    title: title.to_string(),
                    id_publisher: required_i64(fields, "id_publisher")?,
                })
            }
            EntityKind::Stock => {
                let count = optional_i64(fields, "count")?.unwrap_or(Stock::DEFAULT_COUNT);
                validate_stock_count(count)?;
                Entity::Stock(Stock {
                    id,
                    id_book: required_i64(fields, "id_book")?,
                    id_shop: required_i64(fields, "id_shop")?,
                    count,
                })
            }
            EntityKind::Sale => {
                let price = required_price(fields, "price")?;
                validate_price(price)?;
                let count = optional_i64(fields, "count")?.unwrap_or(Sale::DEFAULT_COUNT);
                validate_sale_count(count)?;
                Entity::Sale(Sale {
                    id,
                    price_cents: price.cents(),
                    date_sale: required_datetime(fields, "date_sale")?,
                    id_stock: required_i64(fields, "id_stock")?,
                    count,
                })
            }
        };

        Ok(entity)
    }

    /// The kind of this entity.
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Publisher(_) => EntityKind::Publisher,
            Entity::Shop(_) => EntityKind::Shop,
            Entity::Book(_) => EntityKind::Book,
            Entity::Stock(_) => EntityKind::Stock,
            Entity::Sale(_) => EntityKind::Sale,
        }
    }

    /// The entity's identifier.
    pub fn id(&self) -> i64 {
        match self {
            Entity::Publisher(p) => p.id,
            Entity::Shop(s) => s.id,
            Entity::Book(b) => b.id,
            Entity::Stock(s) => s.id,
            Entity::Sale(s) => s.id,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> FixtureRecord {
        FixtureRecord::from(value)
    }

    #[test]
    fn test_publisher_record() {
        let rec = record(json!({"model": "publisher", "pk": 3, "fields": {"name": "Pearson"}}));
        assert_eq!(
            rec.to_entity().unwrap(),
            Entity::Publisher(Publisher {
                id: 3,
                name: "Pearson".to_string()
            })
        );
    }

    #[test]
    fn test_book_record() {
        let rec = record(json!({
            "model": "book", "pk": 5,
            "fields": {"title": "X", "id_publisher": 3}
        }));
        let entity = rec.to_entity().unwrap();
        assert_eq!(entity.kind(), EntityKind::Book);
        assert_eq!(entity.id(), 5);
        assert!(matches!(entity, Entity::Book(Book { id_publisher: 3, .. })));
    }

    #[test]
    fn test_stock_default_count() {
        let rec = record(json!({
            "model": "stock", "pk": 1,
            "fields": {"id_book": 1, "id_shop": 2}
        }));
        match rec.to_entity().unwrap() {
            Entity::Stock(stock) => assert_eq!(stock.count, 0),
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn test_sale_record() {
        let rec = record(json!({
            "model": "sale", "pk": 1,
            "fields": {
                "price": "50.05",
                "date_sale": "2018-10-25T09:45:24.552Z",
                "id_stock": 1
            }
        }));
        match rec.to_entity().unwrap() {
            Entity::Sale(sale) => {
                assert_eq!(sale.price_cents, 5005);
                assert_eq!(sale.count, 1);
                assert_eq!(sale.id_stock, 1);
            }
            other => panic!("unexpected entity: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_kind() {
        let rec = record(json!({"model": "author", "pk": 1, "fields": {"name": "A"}}));
        assert!(matches!(rec.to_entity(), Err(CoreError::UnknownKind(_))));
    }

    #[test]
    fn test_missing_pk() {
        let rec = record(json!({"model": "shop", "fields": {"name": "Corner"}}));
        assert!(matches!(
            rec.to_entity(),
            Err(CoreError::Validation(ValidationError::Required { field })) if field == "pk"
        ));
    }

    #[test]
    fn test_constraint_violations() {
        let negative_stock = record(json!({
            "model": "stock", "pk": 1,
            "fields": {"id_book": 1, "id_shop": 1, "count": -1}
        }));
        assert!(negative_stock.to_entity().is_err());

        let zero_sale = record(json!({
            "model": "sale", "pk": 1,
            "fields": {"price": "1.00", "date_sale": "2020-01-01", "id_stock": 1, "count": 0}
        }));
        assert!(zero_sale.to_entity().is_err());

        let negative_price = record(json!({
            "model": "sale", "pk": 1,
            "fields": {"price": "-1.00", "date_sale": "2020-01-01", "id_stock": 1}
        }));
        assert!(negative_price.to_entity().is_err());
    }

    #[test]
    fn test_missing_and_unknown_fields() {
        let missing = record(json!({"model": "book", "pk": 1, "fields": {"title": "X"}}));
        assert!(matches!(
            missing.to_entity(),
            Err(CoreError::Validation(ValidationError::Required { .. }))
        ));

        let extra = record(json!({
            "model": "publisher", "pk": 1,
            "fields": {"name": "P", "id": 9}
        }));
        assert!(matches!(
            extra.to_entity(),
            Err(CoreError::Validation(ValidationError::UnknownField { .. }))
        ));
    }

    #[test]
    fn test_parse_records() {
        let records = parse_records(
            r#"[
                {"model": "publisher", "pk": 1, "fields": {"name": "O'Reilly"}},
                {"model": "shop", "pk": 1, "fields": {"name": "Labirint"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].pk(), Some(1));

        assert!(parse_records("{not json").is_err());
        assert!(parse_records(r#"{"model": "shop"}"#).is_err());
    }

    #[test]
    fn test_badly_shaped_records_fail_alone() {
        let records = parse_records(
            r#"[
                {"pk": 2, "fields": {"name": "No Starch Press"}},
                {"model": 7, "pk": 1, "fields": {}},
                {"model": "shop", "pk": "x", "fields": {"name": "Corner"}},
                {"model": "shop", "pk": 1, "fields": ["Corner"]},
                "publisher",
                {"model": "shop", "pk": 2, "fields": {"name": "Mall"}}
            ]"#,
        )
        .unwrap();
        assert_eq!(records.len(), 6);

        let errors: Vec<CoreError> = records[..5]
            .iter()
            .map(|rec| rec.to_entity().unwrap_err())
            .collect();
        assert!(matches!(
            &errors[0],
            CoreError::Validation(ValidationError::Required { field }) if field == "model"
        ));
        assert!(matches!(
            &errors[1],
            CoreError::Validation(ValidationError::InvalidType { field, .. }) if field == "model"
        ));
        assert!(matches!(
            &errors[2],
            CoreError::Validation(ValidationError::InvalidType { field, .. }) if field == "pk"
        ));
        assert!(matches!(
            &errors[3],
            CoreError::Validation(ValidationError::InvalidType { field, .. }) if field == "fields"
        ));
        assert!(matches!(
            &errors[4],
            CoreError::Validation(ValidationError::Required { field }) if field == "model"
        ));

        assert_eq!(records[1].label(), "7");
        assert_eq!(records[2].pk(), None);
        assert_eq!(records[4].label(), "?");
        assert_eq!(records[5].to_entity().unwrap().kind(), EntityKind::Shop);
    }
}

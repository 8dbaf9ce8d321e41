//! # Domain Types
//!
//! The five bookstore entities and the kind tag used to address them.
//!
//! ## Entity Graph
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Entity Graph                                    │
//! │                                                                         │
//! │  ┌─────────────┐                         ┌─────────────┐               │
//! │  │  Publisher  │                         │    Shop     │               │
//! │  │  id, name   │                         │  id, name   │               │
//! │  └──────┬──────┘                         └──────┬──────┘               │
//! │         │ 1:N (cascade)                         │ 1:N (cascade)        │
//! │  ┌──────▼──────┐                                │                      │
//! │  │    Book     │                                │                      │
//! │  │ id, title   │                                │                      │
//! │  │ id_publisher│                                │                      │
//! │  └──────┬──────┘                                │                      │
//! │         │ 1:N (cascade)                         │                      │
//! │         └──────────────►┌─────────────┐◄────────┘                      │
//! │                         │    Stock    │                                 │
//! │                         │ id_book     │                                 │
//! │                         │ id_shop     │                                 │
//! │                         │ count >= 0  │                                 │
//! │                         └──────┬──────┘                                 │
//! │                                │ 1:N (cascade)                          │
//! │                         ┌──────▼──────┐                                 │
//! │                         │    Sale     │                                 │
//! │                         │ price >= 0  │                                 │
//! │                         │ count > 0   │                                 │
//! │                         │ date_sale   │                                 │
//! │                         └─────────────┘                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Relationships are plain foreign-key fields. There are no in-memory
//! back-pointers; the repositories in `bookstore-db` answer navigation
//! questions with queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Money;

// =============================================================================
// Entity Kind
// =============================================================================

/// The five entity kinds, as named by fixture labels and table names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Publisher,
    Shop,
    Book,
    Stock,
    Sale,
}

impl EntityKind {
    /// All kinds, parents before children.
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Publisher,
        EntityKind::Shop,
        EntityKind::Book,
        EntityKind::Stock,
        EntityKind::Sale,
    ];

    /// The fixture label and table name for this kind.
    pub const fn label(&self) -> &'static str {
        match self {
            EntityKind::Publisher => "publisher",
            EntityKind::Shop => "shop",
            EntityKind::Book => "book",
            EntityKind::Stock => "stock",
            EntityKind::Sale => "sale",
        }
    }

    /// Resolves a fixture label. Labels are matched exactly.
    pub fn from_label(label: &str) -> Option<EntityKind> {
        EntityKind::ALL.into_iter().find(|kind| kind.label() == label)
    }

    /// Field names a fixture record of this kind may carry.
    pub const fn field_names(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Publisher | EntityKind::Shop => &["name"],
            EntityKind::Book => &["title", "id_publisher"],
            EntityKind::Stock => &["id_book", "id_shop", "count"],
            EntityKind::Sale => &["price", "date_sale", "id_stock", "count"],
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::from_label(s).ok_or_else(|| CoreError::UnknownKind(s.to_string()))
    }
}

// =============================================================================
// Publisher & Shop
// =============================================================================

/// A book publisher. Owns its books.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// A shop holding stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shop {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Book
// =============================================================================

/// A title published by exactly one publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Owning publisher (FK, required).
    pub id_publisher: i64,
}

// =============================================================================
// Stock
// =============================================================================

/// Copies of one book held by one shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Stock {
    pub id: i64,
    pub id_book: i64,
    pub id_shop: i64,
    /// Copies on hand. Never negative.
    pub count: i64,
}

impl Stock {
    /// Count used when a record doesn't specify one.
    pub const DEFAULT_COUNT: i64 = 0;
}

// =============================================================================
// Sale
// =============================================================================

/// A sale of copies from one stock entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    /// Unit price in cents (NUMERIC(10, 2) semantics). Never negative.
    pub price_cents: i64,
    pub date_sale: DateTime<Utc>,
    pub id_stock: i64,
    /// Copies sold. Always positive.
    pub count: i64,
}

impl Sale {
    /// Count used when a record doesn't specify one.
    pub const DEFAULT_COUNT: i64 = 1;

    /// Returns the unit price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Price times copies sold, `None` on overflow.
    #[inline]
    pub fn revenue(&self) -> Option<Money> {
        self.price().checked_mul(self.count)
    }
}

// =============================================================================
// Sale Detail
// =============================================================================

/// A sale joined with everything above it in the graph.
///
/// Produced by the publisher search so callers can present a sale without
/// issuing follow-up lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleDetail {
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub sale: Sale,
    pub book_id: i64,
    pub book_title: String,
    pub shop_id: i64,
    pub shop_name: String,
    pub publisher_id: i64,
    pub publisher_name: String,
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Repository Module
//!
//! Database repository implementations, one per entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Caller                                                                │
//! │       │  db.books().list_by_publisher(3)                               │
//! │       ▼                                                                 │
//! │  BookRepository                                                        │
//! │  ├── create(&self, title, id_publisher)   auto-assigned id             │
//! │  ├── insert(&self, book)                  explicit id                  │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── list_by_publisher(&self, id)         parent → children            │
//! │  └── delete(&self, id)                    cascades to stock and sales  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PublisherRepository`](publisher::PublisherRepository) - Publishers, upward lookup from a sale
//! - [`ShopRepository`](shop::ShopRepository) - Shops
//! - [`BookRepository`](book::BookRepository) - Books per publisher
//! - [`StockRepository`](stock::StockRepository) - Stock per book / shop
//! - [`SaleRepository`](sale::SaleRepository) - Sales and the publisher search
//!
//! Each repository also exposes a crate-internal `insert_into` that writes
//! through a borrowed connection, so the importer can stage rows inside its
//! own transaction.

use sqlx::{SqliteConnection, SqlitePool};

use bookstore_core::{Entity, EntityKind};

use crate::error::{DbError, DbResult};

pub mod book;
pub mod publisher;
pub mod sale;
pub mod shop;
pub mod stock;

/// Writes any entity with its own identifier through `conn`.
pub(crate) async fn insert_entity(conn: &mut SqliteConnection, entity: &Entity) -> DbResult<()> {
    match entity {
        Entity::Publisher(p) => publisher::insert_into(conn, p).await,
        Entity::Shop(s) => shop::insert_into(conn, s).await,
        Entity::Book(b) => book::insert_into(conn, b).await,
        Entity::Stock(s) => stock::insert_into(conn, s).await,
        Entity::Sale(s) => sale::insert_into(conn, s).await,
    }
}

/// Counts the rows of one table.
pub(crate) async fn count_rows(pool: &SqlitePool, kind: EntityKind) -> DbResult<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", kind.label());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

/// Deletes one row by id. Children go with it through `ON DELETE CASCADE`.
pub(crate) async fn delete_row(pool: &SqlitePool, kind: EntityKind, id: i64) -> DbResult<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", kind.label());
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(kind.label(), id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

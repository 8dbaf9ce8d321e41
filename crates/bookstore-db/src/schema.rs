//! # Schema Lifecycle
//!
//! Creates and drops the five bookstore tables.
//!
//! ## Tables
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  publisher (id PK, name, name_folded)                                  │
//! │  shop      (id PK, name)                                               │
//! │  book      (id PK, title, id_publisher → publisher ON DELETE CASCADE)  │
//! │  stock     (id PK, id_book → book, id_shop → shop, count >= 0)         │
//! │  sale      (id PK, price_cents >= 0, date_sale, id_stock → stock,      │
//! │             count > 0)                                                  │
//! │                                                                         │
//! │  create: parents first      drop: children first                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Existing Tables
//! `create_schema` leaves a table alone when it already exists with the
//! expected columns, and fails with [`DbError::SchemaMismatch`] when it
//! doesn't. Nothing is altered or dropped in that case.
//!
//! ## Name Matching
//! `publisher.name_folded` holds the Unicode-lowercased name. Name searches
//! run `LIKE` against it with an equally folded pattern, since SQLite's
//! `LIKE` only ignores case for ASCII letters.

use sqlx::SqlitePool;
use tracing::{debug, info};

use bookstore_core::EntityKind;

use crate::error::{DbError, DbResult};

/// DDL and expected columns for one table.
struct TableDef {
    kind: EntityKind,
    create: &'static str,
    columns: &'static [&'static str],
}

/// Tables in creation order.
const TABLES: [TableDef; 5] = [
    TableDef {
        kind: EntityKind::Publisher,
        create: r#"
            CREATE TABLE IF NOT EXISTS publisher (
                id          INTEGER PRIMARY KEY,
                name        VARCHAR(100) NOT NULL,
                name_folded VARCHAR(100) NOT NULL
            )
        "#,
        columns: &["id", "name", "name_folded"],
    },
    TableDef {
        kind: EntityKind::Shop,
        create: r#"
            CREATE TABLE IF NOT EXISTS shop (
                id   INTEGER PRIMARY KEY,
                name VARCHAR(100) NOT NULL
            )
        "#,
        columns: &["id", "name"],
    },
    TableDef {
        kind: EntityKind::Book,
        create: r#"
            CREATE TABLE IF NOT EXISTS book (
                id           INTEGER PRIMARY KEY,
                title        VARCHAR(100) NOT NULL,
                id_publisher INTEGER NOT NULL
                             REFERENCES publisher (id) ON DELETE CASCADE
            )
        "#,
        columns: &["id", "title", "id_publisher"],
    },
    TableDef {
        kind: EntityKind::Stock,
        create: r#"
            CREATE TABLE IF NOT EXISTS stock (
                id      INTEGER PRIMARY KEY,
                id_book INTEGER NOT NULL REFERENCES book (id) ON DELETE CASCADE,
                id_shop INTEGER NOT NULL REFERENCES shop (id) ON DELETE CASCADE,
                count   INTEGER NOT NULL DEFAULT 0,
                CHECK (count >= 0)
            )
        "#,
        columns: &["id", "id_book", "id_shop", "count"],
    },
    TableDef {
        kind: EntityKind::Sale,
        create: r#"
            CREATE TABLE IF NOT EXISTS sale (
                id          INTEGER PRIMARY KEY,
                price_cents INTEGER NOT NULL,
                date_sale   TEXT NOT NULL,
                id_stock    INTEGER NOT NULL REFERENCES stock (id) ON DELETE CASCADE,
                count       INTEGER NOT NULL DEFAULT 1,
                CHECK (price_cents >= 0 AND price_cents <= 9999999999),
                CHECK (count > 0)
            )
        "#,
        columns: &["id", "price_cents", "date_sale", "id_stock", "count"],
    },
];

/// Foreign-key indexes used by the joins and cascades.
const INDEXES: [&str; 4] = [
    "CREATE INDEX IF NOT EXISTS idx_book_publisher ON book (id_publisher)",
    "CREATE INDEX IF NOT EXISTS idx_stock_book ON stock (id_book)",
    "CREATE INDEX IF NOT EXISTS idx_stock_shop ON stock (id_shop)",
    "CREATE INDEX IF NOT EXISTS idx_sale_stock ON sale (id_stock)",
];

/// Creates every missing table and checks the shape of existing ones.
///
/// ## Example
/// ```rust,ignore
/// create_schema(&pool).await?;
/// create_schema(&pool).await?; // no-op
/// ```
pub async fn create_schema(pool: &SqlitePool) -> DbResult<()> {
    info!("Creating schema");

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    for table in &TABLES {
        sqlx::query(table.create).execute(&mut *tx).await?;

        let sql = format!("SELECT name FROM pragma_table_info('{}')", table.kind.label());
        let mut found: Vec<String> = sqlx::query_scalar(&sql).fetch_all(&mut *tx).await?;
        found.sort();

        let mut expected: Vec<&str> = table.columns.to_vec();
        expected.sort_unstable();

        if found != expected {
            return Err(DbError::SchemaMismatch {
                table: table.kind.label().to_string(),
                reason: format!("expected columns {:?}, found {:?}", expected, found),
            });
        }
        debug!(table = %table.kind, "Table ready");
    }

    for index in INDEXES {
        sqlx::query(index).execute(&mut *tx).await?;
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    info!("Schema ready");
    Ok(())
}

/// Drops all five tables, children first. Missing tables are ignored.
pub async fn drop_schema(pool: &SqlitePool) -> DbResult<()> {
    info!("Dropping schema");

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    for table in TABLES.iter().rev() {
        let sql = format!("DROP TABLE IF EXISTS {}", table.kind.label());
        sqlx::query(&sql).execute(&mut *tx).await?;
    }

    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

    info!("Schema dropped");
    Ok(())
}

/// Returns which of the five tables currently exist, in creation order.
pub async fn existing_tables(pool: &SqlitePool) -> DbResult<Vec<EntityKind>> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table'")
            .fetch_all(pool)
            .await?;

    Ok(EntityKind::ALL
        .into_iter()
        .filter(|kind| names.iter().any(|name| name == kind.label()))
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

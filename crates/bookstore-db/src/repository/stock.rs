//! # Stock Repository
//!
//! Database operations for stock entries, the join point between books and
//! shops. The store rejects negative counts.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::validation::validate_stock_count;
use bookstore_core::{EntityKind, Stock};

use crate::error::DbResult;
use crate::repository::{count_rows, delete_row};

const STOCK_COLUMNS: &str = "SELECT id, id_book, id_shop, count FROM stock";

/// Repository for stock database operations.
#[derive(Debug, Clone)]
pub struct StockRepository {
    pool: SqlitePool,
}

impl StockRepository {
    /// Creates a new StockRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StockRepository { pool }
    }

    /// Creates a stock entry with a store-assigned id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - negative count
    /// * `DbError::ForeignKeyViolation` - book or shop doesn't exist
    pub async fn create(&self, id_book: i64, id_shop: i64, count: i64) -> DbResult<Stock> {
        validate_stock_count(count)?;

        let result = sqlx::query("INSERT INTO stock (id_book, id_shop, count) VALUES (?1, ?2, ?3)")
            .bind(id_book)
            .bind(id_shop)
            .bind(count)
            .execute(&self.pool)
            .await?;

        let stock = Stock {
            id: result.last_insert_rowid(),
            id_book,
            id_shop,
            count,
        };
        debug!(id = stock.id, id_book, id_shop, count, "Created stock");
        Ok(stock)
    }

    /// Inserts a stock entry keeping its id.
    pub async fn insert(&self, stock: &Stock) -> DbResult<()> {
        validate_stock_count(stock.count)?;
        let mut conn = self.pool.acquire().await?;
        insert_into(&mut conn, stock).await
    }

    /// Gets a stock entry by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Stock>> {
        let sql = format!("{} WHERE id = ?1", STOCK_COLUMNS);
        let stock = sqlx::query_as::<_, Stock>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }

    /// Lists stock entries of one book, ordered by id.
    pub async fn list_by_book(&self, id_book: i64) -> DbResult<Vec<Stock>> {
        let sql = format!("{} WHERE id_book = ?1 ORDER BY id", STOCK_COLUMNS);
        let stocks = sqlx::query_as::<_, Stock>(&sql)
            .bind(id_book)
            .fetch_all(&self.pool)
            .await?;

        Ok(stocks)
    }

    /// Lists stock entries held by one shop, ordered by id.
    pub async fn list_by_shop(&self, id_shop: i64) -> DbResult<Vec<Stock>> {
        let sql = format!("{} WHERE id_shop = ?1 ORDER BY id", STOCK_COLUMNS);
        let stocks = sqlx::query_as::<_, Stock>(&sql)
            .bind(id_shop)
            .fetch_all(&self.pool)
            .await?;

        Ok(stocks)
    }

    /// Counts stock entries.
    pub async fn count(&self) -> DbResult<i64> {
        count_rows(&self.pool, EntityKind::Stock).await
    }

    /// Deletes a stock entry and its sales.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting stock");
        delete_row(&self.pool, EntityKind::Stock, id).await
    }
}

/// Inserts a stock entry with its own id through `conn`.
pub(crate) async fn insert_into(conn: &mut SqliteConnection, stock: &Stock) -> DbResult<()> {
    sqlx::query("INSERT INTO stock (id, id_book, id_shop, count) VALUES (?1, ?2, ?3, ?4)")
        .bind(stock.id)
        .bind(stock.id_book)
        .bind(stock.id_shop)
        .bind(stock.count)
        .execute(conn)
        .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

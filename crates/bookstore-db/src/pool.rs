//! # Database Handle
//!
//! Opening the SQLite pool and the [`Database`] entry point built on it.
//!
//! ```text
//! DbConfig::new("bookstore.db")        DbConfig::in_memory()
//!        │                                    │
//!        └──────────► Database::new ◄─────────┘
//!                          │
//!        ┌─────────────────┼──────────────────────────┐
//!        ▼                 ▼                          ▼
//!  create_schema     publishers() ... sales()   import_records()
//!  drop_schema       (one repository per        stream_sales_by_publisher()
//!  reset_schema       table)                    search_sales_by_publisher()
//! ```
//!
//! Connections are checked out per call and go back to the pool when the
//! call returns, errors included.
//!
//! ## Foreign Keys
//! SQLite ships with foreign keys disabled. Every connection in the pool
//! turns them on, otherwise cascading deletes and parent checks are silently
//! skipped.

use futures::stream::BoxStream;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use bookstore_core::{PublisherSelector, SaleDetail};

use crate::error::{DbError, DbResult};
use crate::repository::book::BookRepository;
use crate::repository::publisher::PublisherRepository;
use crate::repository::sale::{self, SaleRepository};
use crate::repository::shop::ShopRepository;
use crate::repository::stock::StockRepository;
use crate::schema;

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Where the bookstore lives and how many connections may reach it.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./bookstore.db")
///     .pool_size(4)
///     .create_schema(true);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for a private
    /// in-memory database.
    pub path: PathBuf,

    /// Upper bound on pooled connections. Default: 5
    pub pool_size: u32,

    /// How long a caller waits for a free connection. Default: 30 seconds
    pub acquire_timeout: Duration,

    /// Create missing tables right after connecting. Default: false
    pub create_schema: bool,
}

impl DbConfig {
    /// Configuration for a database file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: path.into(),
            pool_size: 5,
            acquire_timeout: Duration::from_secs(30),
            create_schema: false,
        }
    }

    /// Private in-memory database with the five tables already created.
    ///
    /// The pool is pinned to one connection that never idles out: every
    /// SQLite connection to `:memory:` is its own database.
    pub fn in_memory() -> Self {
        DbConfig {
            path: PathBuf::from(MEMORY_PATH),
            pool_size: 1,
            acquire_timeout: Duration::from_secs(5),
            create_schema: true,
        }
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = size;
        self
    }

    pub fn acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    pub fn create_schema(mut self, create: bool) -> Self {
        self.create_schema = create;
        self
    }

    fn is_in_memory(&self) -> bool {
        self.path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let options = if self.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&self.path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        };

        // Without this SQLite ignores REFERENCES and ON DELETE CASCADE
        Ok(options
            .foreign_keys(true)
            .synchronous(SqliteSynchronous::Normal))
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the bookstore database: schema lifecycle, repositories, import
/// and search.
///
/// Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool described by `config`.
    ///
    /// File databases run in WAL mode. Every connection enforces foreign
    /// keys. With `create_schema` set, missing tables are created before
    /// returning.
    ///
    /// ## Errors
    /// * `DbError::ConnectionFailed` - bad path, unreadable file, or the
    ///   first connection couldn't be opened
    /// * `DbError::SchemaMismatch` - see [`Database::create_schema`]
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.path.display(), pool_size = config.pool_size, "Opening bookstore database");

        let mut options = SqlitePoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(1)
            .acquire_timeout(config.acquire_timeout);

        if config.is_in_memory() {
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options
            .connect_with(config.connect_options()?)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!("Pool ready");

        let db = Database { pool };

        if config.create_schema {
            db.create_schema().await?;
        }

        Ok(db)
    }

    // -------------------------------------------------------------------------
    // Schema lifecycle
    // -------------------------------------------------------------------------

    /// Creates all five tables that don't exist yet.
    ///
    /// Fails with [`DbError::SchemaMismatch`] when an existing table has a
    /// different shape.
    pub async fn create_schema(&self) -> DbResult<()> {
        schema::create_schema(&self.pool).await
    }

    /// Drops all five tables and their contents. Unguarded.
    pub async fn drop_schema(&self) -> DbResult<()> {
        schema::drop_schema(&self.pool).await
    }

    /// Drops then recreates the schema, leaving five empty tables.
    pub async fn reset_schema(&self) -> DbResult<()> {
        info!("Resetting schema");
        self.drop_schema().await?;
        self.create_schema().await
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Streams sales whose stock's book belongs to the selected publisher(s).
    ///
    /// See [`SaleRepository::stream_by_publisher`].
    pub fn stream_sales_by_publisher(&self, selector: &str) -> BoxStream<'_, DbResult<SaleDetail>> {
        sale::stream_by_publisher(&self.pool, PublisherSelector::parse(selector))
    }

    /// Collects [`Database::stream_sales_by_publisher`] into a Vec.
    pub async fn search_sales_by_publisher(&self, selector: &str) -> DbResult<Vec<SaleDetail>> {
        self.sales()
            .search_by_publisher(PublisherSelector::parse(selector))
            .await
    }

    // -------------------------------------------------------------------------
    // Repositories
    // -------------------------------------------------------------------------

    /// Raw pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the publisher repository.
    pub fn publishers(&self) -> PublisherRepository {
        PublisherRepository::new(self.pool.clone())
    }

    /// Returns the shop repository.
    pub fn shops(&self) -> ShopRepository {
        ShopRepository::new(self.pool.clone())
    }

    /// Returns the book repository.
    pub fn books(&self) -> BookRepository {
        BookRepository::new(self.pool.clone())
    }

    /// Returns the stock repository.
    pub fn stocks(&self) -> StockRepository {
        StockRepository::new(self.pool.clone())
    }

    /// Returns the sale repository.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone())
    }

    /// Closes the pool. Every later call fails with
    /// [`DbError::ConnectionFailed`].
    pub async fn close(&self) {
        info!("Closing bookstore database");
        self.pool.close().await;
    }

    /// True while the pool can still run a query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert_eq!(db.publishers().count().await.unwrap(), 0);
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("shop.db")
            .pool_size(3)
            .acquire_timeout(Duration::from_secs(1))
            .create_schema(true);

        assert_eq!(config.pool_size, 3);
        assert_eq!(config.acquire_timeout, Duration::from_secs(1));
        assert!(config.create_schema);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_file_database_persists_between_pools() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bookstore.db");

        let db = Database::new(DbConfig::new(&path).create_schema(true))
            .await
            .unwrap();
        db.publishers().create("Pearson").await.unwrap();
        db.close().await;

        let reopened = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(reopened.publishers().count().await.unwrap(), 1);
        reopened.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_reports_connection_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        assert!(!db.health_check().await);
        assert!(matches!(
            db.publishers().count().await,
            Err(DbError::ConnectionFailed(_))
        ));
    }
}

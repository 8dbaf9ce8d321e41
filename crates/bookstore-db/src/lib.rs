//! # bookstore-db: Database Layer for the Bookstore
//!
//! This crate provides database access for the bookstore.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookstore Data Flow                              │
//! │                                                                         │
//! │  bookstore-cli (reset → import → search)                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   bookstore-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Schema    │  │   │
//! │  │   │   (pool.rs)   │    │ publisher.rs  │    │  create_all  │  │   │
//! │  │   │               │    │ book.rs ...   │    │  drop_all    │  │   │
//! │  │   │ SqlitePool    │◄───│ sale.rs       │    │              │  │   │
//! │  │   │               │    │  (search)     │    │              │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           └────────► import.rs (one transaction per batch)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │       SQLite Database (foreign keys ON, cascading deletes)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`schema`] - Table creation and destruction
//! - [`import`] - Bulk import of fixture records
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (one per entity)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bookstore_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("bookstore.db")).await?;
//! db.reset_schema().await?;
//!
//! let report = db.import_file("fixtures/test_data.json").await?;
//! println!("{}", report.summary());
//!
//! let sales = db.search_sales_by_publisher("%press%").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod import;
pub mod pool;
pub mod repository;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use import::{ImportError, ImportReport, SkippedRecord};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::book::BookRepository;
pub use repository::publisher::PublisherRepository;
pub use repository::sale::SaleRepository;
pub use repository::shop::ShopRepository;
pub use repository::stock::StockRepository;

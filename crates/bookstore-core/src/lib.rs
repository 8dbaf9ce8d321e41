//! # bookstore-core: Pure Domain Logic for the Bookstore
//!
//! This crate holds the entity definitions and every rule that can be checked
//! without touching the database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bookstore Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    bookstore-cli                                │   │
//! │  │    reset schema ──► import fixture ──► search ──► print table  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ bookstore-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  fixture  │  │ selector  │  │   │
//! │  │   │ Publisher │  │   Money   │  │  Record   │  │ Id / Name │  │   │
//! │  │   │ Book Sale │  │  (cents)  │  │  Entity   │  │  pattern  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  bookstore-db (Database Layer)                  │   │
//! │  │          schema lifecycle, repositories, importer, search       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Publisher, Shop, Book, Stock, Sale) and [`EntityKind`]
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`fixture`] - Tagged bulk-import records and their typed construction
//! - [`selector`] - Publisher selector resolution (identifier vs name pattern)
//! - [`validation`] - Field and check-constraint validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bookstore_core::money::Money;
//! use bookstore_core::selector::PublisherSelector;
//!
//! let price = Money::parse("9.99").unwrap();
//! assert_eq!(price.cents(), 999);
//!
//! assert_eq!(PublisherSelector::parse("3"), PublisherSelector::Id(3));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod fixture;
pub mod money;
pub mod selector;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use fixture::{Entity, FixtureRecord};
pub use money::Money;
pub use selector::{fold_case, PublisherSelector};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of publisher names, shop names and book titles.
///
/// Mirrors the `VARCHAR(100)` width of the name columns.
pub const MAX_NAME_LEN: usize = 100;

/// Total number of decimal digits a price may carry (`NUMERIC(10, 2)`).
pub const PRICE_PRECISION: u32 = 10;

/// Number of fractional digits kept on a price.
pub const PRICE_SCALE: u32 = 2;

/// Largest representable price in cents: 99,999,999.99.
pub const MAX_PRICE_CENTS: i64 = 9_999_999_999;

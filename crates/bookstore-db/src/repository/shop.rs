//! # Shop Repository
//!
//! Database operations for shops. Deleting a shop removes its stock entries
//! and their sales.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::validation::validate_name;
use bookstore_core::{EntityKind, Shop};

use crate::error::DbResult;
use crate::repository::{count_rows, delete_row};

/// Repository for shop database operations.
#[derive(Debug, Clone)]
pub struct ShopRepository {
    pool: SqlitePool,
}

impl ShopRepository {
    /// Creates a new ShopRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopRepository { pool }
    }

    /// Creates a shop with a store-assigned id.
    pub async fn create(&self, name: &str) -> DbResult<Shop> {
        validate_name("name", name)?;

        let result = sqlx::query("INSERT INTO shop (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let shop = Shop {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        };
        debug!(id = shop.id, name = %shop.name, "Created shop");
        Ok(shop)
    }

    /// Inserts a shop keeping its id.
    pub async fn insert(&self, shop: &Shop) -> DbResult<()> {
        validate_name("name", &shop.name)?;
        let mut conn = self.pool.acquire().await?;
        insert_into(&mut conn, shop).await
    }

    /// Gets a shop by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Shop>> {
        let shop = sqlx::query_as::<_, Shop>("SELECT id, name FROM shop WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(shop)
    }

    /// Lists all shops ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Shop>> {
        let shops = sqlx::query_as::<_, Shop>("SELECT id, name FROM shop ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(shops)
    }

    /// Counts shops.
    pub async fn count(&self) -> DbResult<i64> {
        count_rows(&self.pool, EntityKind::Shop).await
    }

    /// Deletes a shop and its stock.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting shop");
        delete_row(&self.pool, EntityKind::Shop, id).await
    }
}

/// Inserts a shop with its own id through `conn`.
pub(crate) async fn insert_into(conn: &mut SqliteConnection, shop: &Shop) -> DbResult<()> {
    sqlx::query("INSERT INTO shop (id, name) VALUES (?1, ?2)")
        .bind(shop.id)
        .bind(&shop.name)
        .execute(conn)
        .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

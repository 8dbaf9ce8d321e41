//! # Publisher Repository
//!
//! Database operations for publishers.
//!
//! Deleting a publisher removes its books, their stock entries and those
//! entries' sales.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::validation::validate_name;
use bookstore_core::{fold_case, EntityKind, Publisher};

use crate::error::DbResult;
use crate::repository::{count_rows, delete_row};

/// Repository for publisher database operations.
#[derive(Debug, Clone)]
pub struct PublisherRepository {
    pool: SqlitePool,
}

impl PublisherRepository {
    /// Creates a new PublisherRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PublisherRepository { pool }
    }

    /// Creates a publisher with a store-assigned id.
    pub async fn create(&self, name: &str) -> DbResult<Publisher> {
        validate_name("name", name)?;

        let result = sqlx::query("INSERT INTO publisher (name, name_folded) VALUES (?1, ?2)")
            .bind(name)
            .bind(fold_case(name))
            .execute(&self.pool)
            .await?;

        let publisher = Publisher {
            id: result.last_insert_rowid(),
            name: name.to_string(),
        };
        debug!(id = publisher.id, name = %publisher.name, "Created publisher");
        Ok(publisher)
    }

    /// Inserts a publisher keeping its id.
    pub async fn insert(&self, publisher: &Publisher) -> DbResult<()> {
        validate_name("name", &publisher.name)?;
        let mut conn = self.pool.acquire().await?;
        insert_into(&mut conn, publisher).await
    }

    /// Gets a publisher by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Publisher>> {
        let publisher = sqlx::query_as::<_, Publisher>(
            r#"
            SELECT id, name
            FROM publisher
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publisher)
    }

    /// Finds publishers whose name matches a `LIKE` pattern, ignoring case
    /// in any script.
    pub async fn find_by_name(&self, pattern: &str) -> DbResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>(
            r#"
            SELECT id, name
            FROM publisher
            WHERE name_folded LIKE ?1
            ORDER BY id
            "#,
        )
        .bind(fold_case(pattern))
        .fetch_all(&self.pool)
        .await?;

        Ok(publishers)
    }

    /// Lists all publishers ordered by id.
    pub async fn list(&self) -> DbResult<Vec<Publisher>> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT id, name FROM publisher ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(publishers)
    }

    /// Navigates from a sale up to its publisher (sale → stock → book → publisher).
    pub async fn of_sale(&self, sale_id: i64) -> DbResult<Option<Publisher>> {
        let publisher = sqlx::query_as::<_, Publisher>(
            r#"
            SELECT p.id, p.name
            FROM sale s
            INNER JOIN stock st ON st.id = s.id_stock
            INNER JOIN book b ON b.id = st.id_book
            INNER JOIN publisher p ON p.id = b.id_publisher
            WHERE s.id = ?1
            "#,
        )
        .bind(sale_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(publisher)
    }

    /// Counts publishers.
    pub async fn count(&self) -> DbResult<i64> {
        count_rows(&self.pool, EntityKind::Publisher).await
    }

    /// Deletes a publisher and everything it owns.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting publisher");
        delete_row(&self.pool, EntityKind::Publisher, id).await
    }
}

/// Inserts a publisher with its own id through `conn`.
pub(crate) async fn insert_into(conn: &mut SqliteConnection, publisher: &Publisher) -> DbResult<()> {
    sqlx::query("INSERT INTO publisher (id, name, name_folded) VALUES (?1, ?2, ?3)")
        .bind(publisher.id)
        .bind(&publisher.name)
        .bind(fold_case(&publisher.name))
        .execute(conn)
        .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use bookstore_core::{Money, Publisher};
    use chrono::Utc;

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.publishers();

        let created = repo.create("O'Reilly").await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap();

        assert_eq!(fetched, Some(created));
        assert_eq!(repo.get_by_id(999).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_keeps_id_and_rejects_duplicates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.publishers();
        let pearson = Publisher {
            id: 3,
            name: "Pearson".to_string(),
        };

        repo.insert(&pearson).await.unwrap();
        assert_eq!(repo.get_by_id(3).await.unwrap(), Some(pearson.clone()));

        let err = repo.insert(&pearson).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_create_validates_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.publishers().create("  ").await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
        assert_eq!(db.publishers().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_find_by_name_is_case_insensitive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.publishers();
        repo.create("No Starch Press").await.unwrap();
        repo.create("Microsoft Press").await.unwrap();
        repo.create("Pearson").await.unwrap();

        assert_eq!(repo.find_by_name("%PRESS%").await.unwrap().len(), 2);
        assert_eq!(repo.find_by_name("pearso_").await.unwrap().len(), 1);
        assert!(repo.find_by_name("Press").await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_find_by_name_folds_cyrillic() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.publishers();
        repo.insert(&Publisher {
            id: 7,
            name: "Эксмо".to_string(),
        })
        .await
        .unwrap();

        for pattern in ["Эксмо", "эксмо", "ЭКСМО", "%КСМО", "_ксм_"] {
            let found = repo.find_by_name(pattern).await.unwrap();
            assert_eq!(found.len(), 1, "pattern {}", pattern);
            assert_eq!(found[0].name, "Эксмо");
        }
    }

    #[tokio::test]
    async fn test_of_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let publisher = db.publishers().create("Pearson").await.unwrap();
        let shop = db.shops().create("Corner").await.unwrap();
        let book = db.books().create("X", publisher.id).await.unwrap();
        let stock = db.stocks().create(book.id, shop.id, 5).await.unwrap();
        let sale = db
            .sales()
            .create(stock.id, Money::from_cents(999), Utc::now(), 1)
            .await
            .unwrap();

        assert_eq!(db.publishers().of_sale(sale.id).await.unwrap(), Some(publisher));
        assert_eq!(db.publishers().of_sale(sale.id + 1).await.unwrap(), None);
    }
}

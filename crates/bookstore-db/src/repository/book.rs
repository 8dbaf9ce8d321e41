//! # Book Repository
//!
//! Database operations for books. A book belongs to exactly one publisher;
//! deleting it removes its stock entries and their sales.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::validation::validate_name;
use bookstore_core::{Book, EntityKind};

use crate::error::DbResult;
use crate::repository::{count_rows, delete_row};

/// Repository for book database operations.
#[derive(Debug, Clone)]
pub struct BookRepository {
    pool: SqlitePool,
}

impl BookRepository {
    /// Creates a new BookRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BookRepository { pool }
    }

    /// Creates a book with a store-assigned id.
    ///
    /// ## Errors
    /// * `DbError::ForeignKeyViolation` - publisher doesn't exist
    pub async fn create(&self, title: &str, id_publisher: i64) -> DbResult<Book> {
        validate_name("title", title)?;

        let result = sqlx::query("INSERT INTO book (title, id_publisher) VALUES (?1, ?2)")
            .bind(title)
            .bind(id_publisher)
            .execute(&self.pool)
            .await?;

        let book = Book {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            id_publisher,
        };
        debug!(id = book.id, id_publisher, "Created book");
        Ok(book)
    }

    /// Inserts a book keeping its id.
    pub async fn insert(&self, book: &Book) -> DbResult<()> {
        validate_name("title", &book.title)?;
        let mut conn = self.pool.acquire().await?;
        insert_into(&mut conn, book).await
    }

    /// Gets a book by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, id_publisher
            FROM book
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(book)
    }

    /// Lists the books of one publisher, ordered by id.
    pub async fn list_by_publisher(&self, id_publisher: i64) -> DbResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>(
            r#"
            SELECT id, title, id_publisher
            FROM book
            WHERE id_publisher = ?1
            ORDER BY id
            "#,
        )
        .bind(id_publisher)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Counts books.
    pub async fn count(&self) -> DbResult<i64> {
        count_rows(&self.pool, EntityKind::Book).await
    }

    /// Deletes a book and its stock.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting book");
        delete_row(&self.pool, EntityKind::Book, id).await
    }
}

/// Inserts a book with its own id through `conn`.
pub(crate) async fn insert_into(conn: &mut SqliteConnection, book: &Book) -> DbResult<()> {
    sqlx::query("INSERT INTO book (id, title, id_publisher) VALUES (?1, ?2, ?3)")
        .bind(book.id)
        .bind(&book.title)
        .bind(book.id_publisher)
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
    use bookstore_core::Book;

    #[tokio::test]
    async fn test_book_requires_existing_publisher() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let err = db.books().create("Orphan", 7).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        let err = db
            .books()
            .insert(&Book {
                id: 1,
                title: "Orphan".to_string(),
                id_publisher: 7,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.books().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_by_publisher() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let oreilly = db.publishers().create("O'Reilly").await.unwrap();
        let pearson = db.publishers().create("Pearson").await.unwrap();

        db.books().create("Learning Python", oreilly.id).await.unwrap();
        db.books().create("Programming Python", oreilly.id).await.unwrap();
        db.books().create("Algorithms", pearson.id).await.unwrap();

        let titles: Vec<String> = db
            .books()
            .list_by_publisher(oreilly.id)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Learning Python", "Programming Python"]);

        let book = db.books().list_by_publisher(pearson.id).await.unwrap().remove(0);
        assert_eq!(db.books().get_by_id(book.id).await.unwrap(), Some(book));
    }
}

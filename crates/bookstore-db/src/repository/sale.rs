//! # Sale Repository
//!
//! Database operations for sales, and the publisher-scoped sales search.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sales By Publisher                                   │
//! │                                                                         │
//! │  "3" / "Pearson" / "%ears%"                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PublisherSelector::parse()                                            │
//! │       ├── Id(3)            → WHERE p.id = ?1                           │
//! │       ├── IdOutOfRange(..) → empty stream, no query                    │
//! │       └── NamePattern(..)  → WHERE p.name_folded LIKE fold_case(?1)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sale ─► stock ─┬─► book ─► publisher                                  │
//! │                 └─► shop                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Stream<SaleDetail>   rows decoded as they're pulled                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows come back in sale id order. A selector matching nothing yields an
//! empty stream, never an error.

use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use bookstore_core::validation::{validate_price, validate_sale_count};
use bookstore_core::{fold_case, EntityKind, Money, PublisherSelector, Sale, SaleDetail};

use crate::error::{DbError, DbResult};
use crate::repository::{count_rows, delete_row};

/// Sale/stock/book/shop/publisher join, completed with a `WHERE` clause.
///
/// Expands to a `&'static str`: the search stream may borrow only the pool.
macro_rules! sales_by_publisher {
    ($filter:literal) => {
        concat!(
            "SELECT s.id, s.price_cents, s.date_sale, s.id_stock, s.count, ",
            "b.id AS book_id, b.title AS book_title, ",
            "sh.id AS shop_id, sh.name AS shop_name, ",
            "p.id AS publisher_id, p.name AS publisher_name ",
            "FROM sale s ",
            "INNER JOIN stock st ON st.id = s.id_stock ",
            "INNER JOIN book b ON b.id = st.id_book ",
            "INNER JOIN shop sh ON sh.id = st.id_shop ",
            "INNER JOIN publisher p ON p.id = b.id_publisher ",
            $filter,
            " ORDER BY s.id"
        )
    };
}

const SALES_BY_PUBLISHER_ID: &str = sales_by_publisher!("WHERE p.id = ?1");

const SALES_BY_PUBLISHER_NAME: &str = sales_by_publisher!("WHERE p.name_folded LIKE ?1");

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale against a stock entry with a store-assigned id.
    ///
    /// ## Errors
    /// * `DbError::Validation` - negative price or non-positive count
    /// * `DbError::ForeignKeyViolation` - stock entry doesn't exist
    pub async fn create(
        &self,
        id_stock: i64,
        price: Money,
        date_sale: DateTime<Utc>,
        count: i64,
    ) -> DbResult<Sale> {
        validate_price(price)?;
        validate_sale_count(count)?;

        let result = sqlx::query(
            "INSERT INTO sale (price_cents, date_sale, id_stock, count) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(price.cents())
        .bind(date_sale)
        .bind(id_stock)
        .bind(count)
        .execute(&self.pool)
        .await?;

        let sale = Sale {
            id: result.last_insert_rowid(),
            price_cents: price.cents(),
            date_sale,
            id_stock,
            count,
        };
        debug!(id = sale.id, id_stock, price = %price, count, "Created sale");
        Ok(sale)
    }

    /// Inserts a sale keeping its id.
    pub async fn insert(&self, sale: &Sale) -> DbResult<()> {
        validate_price(sale.price())?;
        validate_sale_count(sale.count)?;
        let mut conn = self.pool.acquire().await?;
        insert_into(&mut conn, sale).await
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, price_cents, date_sale, id_stock, count
            FROM sale
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Lists the sales recorded against one stock entry, ordered by id.
    pub async fn list_by_stock(&self, id_stock: i64) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, price_cents, date_sale, id_stock, count
            FROM sale
            WHERE id_stock = ?1
            ORDER BY id
            "#,
        )
        .bind(id_stock)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Counts sales.
    pub async fn count(&self) -> DbResult<i64> {
        count_rows(&self.pool, EntityKind::Sale).await
    }

    /// Deletes a sale.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting sale");
        delete_row(&self.pool, EntityKind::Sale, id).await
    }

    /// Streams the sales of every publisher the selector matches.
    pub fn stream_by_publisher(
        &self,
        selector: PublisherSelector,
    ) -> BoxStream<'_, DbResult<SaleDetail>> {
        stream_by_publisher(&self.pool, selector)
    }

    /// Collects the sales of every publisher the selector matches.
    pub async fn search_by_publisher(&self, selector: PublisherSelector) -> DbResult<Vec<SaleDetail>> {
        stream_by_publisher(&self.pool, selector).try_collect().await
    }
}

/// Runs the publisher-scoped sales query against `pool`.
///
/// Nothing is read until the stream is polled.
pub(crate) fn stream_by_publisher<'e>(
    pool: &'e SqlitePool,
    selector: PublisherSelector,
) -> BoxStream<'e, DbResult<SaleDetail>> {
    debug!(%selector, "Searching sales by publisher");

    match selector {
        PublisherSelector::Id(id) => sqlx::query_as::<_, SaleDetail>(SALES_BY_PUBLISHER_ID)
            .bind(id)
            .fetch(pool)
            .map_err(DbError::from)
            .boxed(),
        // No stored id can be this large
        PublisherSelector::IdOutOfRange(_) => stream::empty().boxed(),
        PublisherSelector::NamePattern(pattern) => {
            sqlx::query_as::<_, SaleDetail>(SALES_BY_PUBLISHER_NAME)
                .bind(fold_case(&pattern))
                .fetch(pool)
                .map_err(DbError::from)
                .boxed()
        }
    }
}

/// Inserts a sale with its own id through `conn`.
pub(crate) async fn insert_into(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        "INSERT INTO sale (id, price_cents, date_sale, id_stock, count) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(sale.id)
    .bind(sale.price_cents)
    .bind(sale.date_sale)
    .bind(sale.id_stock)
    .bind(sale.count)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    struct Seeded {
        db: Database,
        pearson: i64,
        press_sales: BTreeSet<i64>,
        pearson_sales: BTreeSet<i64>,
    }

    /// Three publishers, two shops, five sales.
    async fn seed() -> Seeded {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let day = Utc.with_ymd_and_hms(2022, 10, 25, 9, 45, 24).unwrap();

        let no_starch = db.publishers().create("No Starch Press").await.unwrap();
        let microsoft = db.publishers().create("Microsoft Press").await.unwrap();
        let pearson = db.publishers().create("Pearson").await.unwrap();
        let corner = db.shops().create("Corner").await.unwrap();
        let mall = db.shops().create("Mall").await.unwrap();

        let mut press_sales = BTreeSet::new();
        let mut pearson_sales = BTreeSet::new();

        for (publisher, title) in [(&no_starch, "Hacking"), (&microsoft, "Code Complete")] {
            let book = db.books().create(title, publisher.id).await.unwrap();
            let stock = db.stocks().create(book.id, corner.id, 3).await.unwrap();
            let sale = db
                .sales()
                .create(stock.id, Money::from_cents(2500), day, 1)
                .await
                .unwrap();
            press_sales.insert(sale.id);
        }

        let book = db.books().create("Algorithms", pearson.id).await.unwrap();
        for (shop, sales) in [(&corner, 2), (&mall, 1)] {
            let stock = db.stocks().create(book.id, shop.id, 5).await.unwrap();
            for count in 1..=sales {
                let sale = db
                    .sales()
                    .create(stock.id, Money::from_cents(4999), day, count)
                    .await
                    .unwrap();
                pearson_sales.insert(sale.id);
            }
        }

        Seeded {
            db,
            pearson: pearson.id,
            press_sales,
            pearson_sales,
        }
    }

    async fn search_ids(db: &Database, selector: &str) -> BTreeSet<i64> {
        db.search_sales_by_publisher(selector)
            .await
            .unwrap()
            .into_iter()
            .map(|detail| detail.sale.id)
            .collect()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let publisher = db.publishers().create("Pearson").await.unwrap();
        let shop = db.shops().create("Corner").await.unwrap();
        let book = db.books().create("X", publisher.id).await.unwrap();
        let stock = db.stocks().create(book.id, shop.id, 5).await.unwrap();
        let date = Utc.with_ymd_and_hms(2022, 11, 9, 12, 0, 0).unwrap();

        let sale = db
            .sales()
            .create(stock.id, Money::from_cents(999), date, 2)
            .await
            .unwrap();

        let fetched = db.sales().get_by_id(sale.id).await.unwrap().unwrap();
        assert_eq!(fetched, sale);
        assert_eq!(fetched.price().to_string(), "9.99");
        assert_eq!(fetched.revenue(), Some(Money::from_cents(1998)));
        assert_eq!(db.sales().list_by_stock(stock.id).await.unwrap(), vec![sale]);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_values() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(matches!(
            db.sales().create(1, Money::from_cents(-1), Utc::now(), 1).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            db.sales().create(1, Money::from_cents(100), Utc::now(), 0).await,
            Err(DbError::Validation(_))
        ));
        assert!(matches!(
            db.sales().create(1, Money::from_cents(100), Utc::now(), 1).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_search_by_id_returns_exactly_publisher_sales() {
        let seeded = seed().await;

        let found = search_ids(&seeded.db, &seeded.pearson.to_string()).await;
        assert_eq!(found, seeded.pearson_sales);
        assert_eq!(found.len(), 3);
    }

    #[tokio::test]
    async fn test_search_by_exact_name_equals_search_by_id() {
        let seeded = seed().await;

        let by_name = search_ids(&seeded.db, "Pearson").await;
        let by_id = search_ids(&seeded.db, &seeded.pearson.to_string()).await;
        assert_eq!(by_name, by_id);
        assert_eq!(search_ids(&seeded.db, "PEARSON").await, by_id);
    }

    #[tokio::test]
    async fn test_search_pattern_is_union_over_matching_publishers() {
        let seeded = seed().await;

        assert_eq!(search_ids(&seeded.db, "%press%").await, seeded.press_sales);
        assert_eq!(search_ids(&seeded.db, "%PRESS").await, seeded.press_sales);

        let everything: BTreeSet<i64> = seeded
            .press_sales
            .union(&seeded.pearson_sales)
            .copied()
            .collect();
        assert_eq!(search_ids(&seeded.db, "%").await, everything);
    }

    #[tokio::test]
    async fn test_search_matching_nothing_is_empty() {
        let seeded = seed().await;

        assert!(search_ids(&seeded.db, "9999").await.is_empty());
        assert!(search_ids(&seeded.db, "99999999999999999999").await.is_empty());
        assert!(search_ids(&seeded.db, "Nobody").await.is_empty());
        assert!(search_ids(&seeded.db, "").await.is_empty());
        // Without wildcards the pattern must match the whole name
        assert!(search_ids(&seeded.db, "Press").await.is_empty());
    }

    #[tokio::test]
    async fn test_search_after_publisher_delete_is_empty() {
        let seeded = seed().await;

        seeded.db.publishers().delete(seeded.pearson).await.unwrap();

        assert!(search_ids(&seeded.db, &seeded.pearson.to_string()).await.is_empty());
        assert_eq!(seeded.db.sales().count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_stream_yields_details() {
        let seeded = seed().await;

        let details: Vec<SaleDetail> = seeded
            .db
            .stream_sales_by_publisher("%soft%")
            .try_collect()
            .await
            .unwrap();

        assert_eq!(details.len(), 1);
        let detail = &details[0];
        assert_eq!(detail.book_title, "Code Complete");
        assert_eq!(detail.shop_name, "Corner");
        assert_eq!(detail.publisher_name, "Microsoft Press");
        assert_eq!(detail.sale.price().to_string(), "25.00");
        assert_eq!(
            detail.sale.date_sale,
            Utc.with_ymd_and_hms(2022, 10, 25, 9, 45, 24).unwrap()
        );
    }

    #[tokio::test]
    async fn test_search_by_name_ignores_case_beyond_ascii() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let eksmo = db.publishers().create("Эксмо").await.unwrap();
        let book = db.books().create("Мастер и Маргарита", eksmo.id).await.unwrap();
        let shop = db.shops().create("Лабиринт").await.unwrap();
        let stock = db.stocks().create(book.id, shop.id, 2).await.unwrap();
        let sale = db
            .sales()
            .create(stock.id, Money::from_cents(45000), Utc::now(), 1)
            .await
            .unwrap();

        for selector in ["Эксмо", "эксмо", "ЭКСМО", "%КСМО", "%кс%"] {
            let found = db.search_sales_by_publisher(selector).await.unwrap();
            assert_eq!(found.len(), 1, "selector {}", selector);
            assert_eq!(found[0].sale.id, sale.id);
            assert_eq!(found[0].publisher_name, "Эксмо");
        }
        assert!(db.search_sales_by_publisher("Эксмо!").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_pearson() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.publishers()
            .insert(&bookstore_core::Publisher {
                id: 3,
                name: "Pearson".to_string(),
            })
            .await
            .unwrap();
        let book = db.books().create("X", 3).await.unwrap();
        let shop = db.shops().create("Corner").await.unwrap();
        let stock = db.stocks().create(book.id, shop.id, 5).await.unwrap();
        let sale = db
            .sales()
            .create(stock.id, Money::parse("9.99").unwrap(), Utc::now(), 1)
            .await
            .unwrap();

        for selector in ["3", "Pearson", "%ears%"] {
            let found = db.search_sales_by_publisher(selector).await.unwrap();
            assert_eq!(found.len(), 1, "selector {}", selector);
            assert_eq!(found[0].sale.id, sale.id);
            assert_eq!(found[0].sale.price_cents, 999);
        }
    }
}

//! # bookstore
//!
//! Rebuilds the bookstore database from a fixture file and prints the sales
//! of the selected publishers.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          bookstore                                      │
//! │                                                                         │
//! │  1. Load .env, read BOOKSTORE_* variables, apply flags                 │
//! │  2. Open the database                                                  │
//! │  3. Drop and recreate the five tables (unless --no-reset)              │
//! │  4. Import the fixture, print the report                               │
//! │  5. For each selector: search, print a Book / Shop / Price / Date table│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```text
//! bookstore                          # the four demo selectors
//! bookstore 3 "%press%"              # publisher id 3, then names containing "press"
//! bookstore --db /tmp/b.db --no-reset Pearson
//! ```

mod config;
mod table;

use std::path::PathBuf;

use clap::Parser;
use futures::TryStreamExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookstore_db::{Database, DbConfig};

use crate::config::AppConfig;
use crate::table::{caption, SalesTable};

/// Selectors run when none are given.
const DEFAULT_SELECTORS: [&str; 4] = ["%press%", "3", "Pearson", "%reilly"];

/// Bookstore sales search
#[derive(Parser, Debug)]
#[command(name = "bookstore")]
#[command(about = "Import bookstore fixtures and search sales by publisher")]
struct Args {
    /// SQLite database file (overrides BOOKSTORE_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// JSON fixture to import (overrides BOOKSTORE_FIXTURE)
    #[arg(long, short = 'f')]
    fixture: Option<PathBuf>,

    /// Keep existing tables and rows instead of dropping them first
    #[arg(long)]
    no_reset: bool,

    /// Publisher ids or name patterns (`%` any run, `_` one character)
    selectors: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = AppConfig::load()?.with_overrides(args.db, args.fixture);
    info!(
        db = %config.db_path.display(),
        fixture = %config.fixture_path.display(),
        "Configuration loaded"
    );

    let db = Database::new(
        DbConfig::new(config.db_path.clone()).pool_size(config.max_connections),
    )
    .await?;

    if args.no_reset {
        db.create_schema().await?;
    } else {
        db.reset_schema().await?;
    }

    let report = db.import_file(&config.fixture_path).await?;
    println!("Imported {}", report.summary());
    for skipped in report.skipped() {
        println!("  skipped {}", skipped);
    }
    println!();

    let selectors = if args.selectors.is_empty() {
        DEFAULT_SELECTORS.iter().map(|s| s.to_string()).collect()
    } else {
        args.selectors
    };

    for selector in &selectors {
        let mut table = SalesTable::new();
        let mut sales = db.stream_sales_by_publisher(selector);
        while let Some(detail) = sales.try_next().await? {
            table.push(&detail);
        }

        println!("{}", caption(selector));
        if table.is_empty() {
            println!("(no sales)");
        } else {
            println!("{}", table.render());
            println!("{} sale(s)", table.len());
        }
        println!();
    }

    db.close().await;
    Ok(())
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins when set.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bookstore=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

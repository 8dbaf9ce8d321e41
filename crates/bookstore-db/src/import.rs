//! # Bulk Import
//!
//! Loads fixture records into the database as one batch.
//!
//! ## Import Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Batch Import                                    │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    │                                                                    │
//! │    ├── record 0 ── kind? ── fields? ── INSERT ──► staged               │
//! │    ├── record 1 ── kind? ✗ ─────────────────────► skipped (UnknownKind)│
//! │    ├── record 2 ── kind? ── fields? ✗ ──────────► skipped (Validation) │
//! │    ├── record 3 ── kind? ── fields? ── INSERT ✗ ► skipped (Rejected)   │
//! │    ├── record 4 ── kind? ── fields? ── INSERT ✗✗ ► Err, rolled back    │
//! │    └── ...                                                             │
//! │    │                                                                    │
//! │  COMMIT ── ok ──► ImportReport { imported, skipped }                   │
//! │         └─ ✗ ───► Err(DbError), nothing from the batch persists        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! Foreign keys are checked as each row is written, against rows already
//! committed plus rows staged earlier in the same batch. A book listed before
//! its publisher is rejected even if the publisher follows. Parents first.
//!
//! An INSERT failing on a constraint only undoes that one statement; the
//! rest of the batch stays staged. Any other INSERT failure aborts the batch.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use bookstore_core::fixture::parse_records;
use bookstore_core::{CoreError, EntityKind, FixtureRecord, ValidationError};

use crate::error::{DbError, DbResult};
use crate::pool::Database;
use crate::repository::insert_entity;

// =============================================================================
// Errors
// =============================================================================

/// Why a single record was left out of a batch.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The kind label isn't one of the five entities.
    #[error("unknown kind '{0}'")]
    UnknownKind(String),

    /// Record badly shaped, or fields missing, of the wrong type, unexpected
    /// or out of range.
    #[error("invalid record: {0}")]
    Validation(ValidationError),

    /// A constraint refused the row (missing parent, duplicate id, check).
    #[error("rejected: {0}")]
    Rejected(DbError),
}

impl From<CoreError> for ImportError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownKind(label) => ImportError::UnknownKind(label),
            CoreError::Validation(err) => ImportError::Validation(err),
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// A record left out of the batch, with its position in the input.
#[derive(Debug)]
pub struct SkippedRecord {
    /// Zero-based position in the input sequence.
    pub index: usize,
    /// Kind label as given.
    pub model: String,
    /// Identifier as given.
    pub pk: Option<i64>,
    pub reason: ImportError,
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pk {
            Some(pk) => write!(f, "#{} {}({}): {}", self.index, self.model, pk, self.reason),
            None => write!(f, "#{} {}: {}", self.index, self.model, self.reason),
        }
    }
}

/// Outcome of a committed batch.
#[derive(Debug, Default)]
pub struct ImportReport {
    imported: BTreeMap<EntityKind, usize>,
    skipped: Vec<SkippedRecord>,
}

impl ImportReport {
    /// Number of rows of `kind` written by this batch.
    pub fn imported(&self, kind: EntityKind) -> usize {
        self.imported.get(&kind).copied().unwrap_or(0)
    }

    /// Number of rows written across all kinds.
    pub fn total_imported(&self) -> usize {
        self.imported.values().sum()
    }

    /// Records left out, in input order.
    pub fn skipped(&self) -> &[SkippedRecord] {
        &self.skipped
    }

    /// True when every record made it in.
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }

    /// One-line summary, e.g. `publisher: 4, shop: 3, book: 0, stock: 0, sale: 0 (1 skipped)`.
    pub fn summary(&self) -> String {
        let counts: Vec<String> = EntityKind::ALL
            .iter()
            .map(|kind| format!("{}: {}", kind, self.imported(*kind)))
            .collect();
        format!("{} ({} skipped)", counts.join(", "), self.skipped.len())
    }

    fn record_imported(&mut self, kind: EntityKind) {
        *self.imported.entry(kind).or_insert(0) += 1;
    }

    fn record_skipped(&mut self, index: usize, record: &FixtureRecord, reason: ImportError) {
        warn!(
            index,
            model = %record.label(),
            pk = ?record.pk(),
            reason = %reason,
            "Skipping fixture record"
        );
        self.skipped.push(SkippedRecord {
            index,
            model: record.label(),
            pk: record.pk(),
            reason,
        });
    }
}

// =============================================================================
// Database Import Operations
// =============================================================================

impl Database {
    /// Imports records as one transaction.
    ///
    /// Bad records are logged and listed in the report; they never stop the
    /// batch. A record is bad when it doesn't resolve to an entity or when
    /// the store rejects it on a constraint. Any other store failure (no such
    /// table, lost connection) and a failure to open or commit the
    /// transaction are errors, and then nothing from the batch persists.
    pub async fn import_records(&self, records: &[FixtureRecord]) -> DbResult<ImportReport> {
        info!(records = records.len(), "Importing fixture records");

        let mut tx = self
            .pool()
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut report = ImportReport::default();

        for (index, record) in records.iter().enumerate() {
            let entity = match record.to_entity() {
                Ok(entity) => entity,
                Err(err) => {
                    report.record_skipped(index, record, err.into());
                    continue;
                }
            };

            match insert_entity(&mut *tx, &entity).await {
                Ok(()) => {
                    debug!(index, kind = %entity.kind(), id = entity.id(), "Staged record");
                    report.record_imported(entity.kind());
                }
                Err(err) if err.is_constraint_violation() => {
                    report.record_skipped(index, record, ImportError::Rejected(err))
                }
                Err(err) => {
                    // Dropping the transaction rolls back everything staged
                    error!(index, error = %err, "Import aborted");
                    return Err(err);
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            imported = report.total_imported(),
            skipped = report.skipped.len(),
            "Import committed"
        );

        Ok(report)
    }

    /// Imports a JSON array of records.
    ///
    /// Malformed JSON fails the whole call with [`DbError::Fixture`] before
    /// anything is written.
    pub async fn import_json(&self, json: &str) -> DbResult<ImportReport> {
        let records = parse_records(json).map_err(|e| DbError::Fixture(e.to_string()))?;
        self.import_records(&records).await
    }

    /// Reads and imports a JSON fixture file.
    pub async fn import_file(&self, path: impl AsRef<Path>) -> DbResult<ImportReport> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading fixture file");

        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DbError::Fixture(format!("{}: {}", path.display(), e)))?;

        self.import_json(&json).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

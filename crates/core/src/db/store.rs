use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::RegisterRecord;

/// Error type for destination-store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store did not answer the liveness check.
    #[error("destination store unreachable: {0}")]
    Unreachable(String),

    /// Any other backend failure.
    #[error("destination store error: {0}")]
    Backend(String),
}

/// Provenance for one completed extraction run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRunRecord {
    /// SHA-256 of the description document, when the caller computed one.
    pub description_digest: Option<String>,
    /// SHA-256 of the reference manual, when present and hashed.
    pub manual_digest: Option<String>,
    pub records_written: usize,
    pub started_at: String,
    pub finished_at: String,
}

/// Abstract destination store for the extracted record set.
///
/// The pipeline depends on exactly three operations: a liveness check once
/// per run, `clear` (drop all prior records for this dataset), and
/// `insert_many` (append the new set). The two mutations run sequentially
/// with no transaction across them; a concurrent reader may observe an
/// empty store between the two steps, and bulk-insert atomicity is only as
/// strong as the backend's own guarantee.
pub trait RecordStore {
    fn ping(&self) -> Result<(), StoreError>;

    fn clear(&self) -> Result<(), StoreError>;

    /// Append the full new record set; returns the count written.
    fn insert_many(&self, records: &[RegisterRecord]) -> Result<usize, StoreError>;

    /// Optional run bookkeeping; backends without a notion of runs keep the
    /// default no-op.
    fn record_run(&self, _run: &ExtractionRunRecord) -> Result<(), StoreError> {
        Ok(())
    }
}

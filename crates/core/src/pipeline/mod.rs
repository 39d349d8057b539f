//! Pipeline orchestration: load, resolve, mine, flatten, replace the store.
//!
//! One run fully replaces the destination record set. The stages run
//! synchronously in sequence; the only long-blocking steps are the OCR
//! fallback and the storage write, both treated as ordinary blocking calls.
//! A failure before the first store mutation writes nothing; a failure
//! between `clear` and `insert_many` leaves the destination in an undefined
//! partial state — an accepted limitation, not retried or rolled back.

use std::path::PathBuf;

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::{ExtractionRunRecord, RecordStore, StoreError};
use crate::flatten::flatten_peripherals;
use crate::mining::{mine_address_overrides, MinerConfig};
use crate::model::AddressOverrideMap;
use crate::svd::{load_peripheral_map, SvdError};

/// Inputs for one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    pub description_path: PathBuf,
    /// Reference manual to mine base-address overrides from; the run
    /// proceeds on declared addresses alone when absent.
    pub manual_path: Option<PathBuf>,
    /// Optional precomputed SHA-256 of the description, for run bookkeeping.
    pub description_digest: Option<String>,
    /// Optional precomputed SHA-256 of the manual.
    pub manual_digest: Option<String>,
}

impl ExtractionRequest {
    pub fn new(description_path: impl Into<PathBuf>) -> Self {
        Self {
            description_path: description_path.into(),
            manual_path: None,
            description_digest: None,
            manual_digest: None,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub records_written: usize,
    pub peripherals_resolved: usize,
    pub peripherals_skipped: Vec<String>,
    pub overrides_found: usize,
    pub started_at: String,
    pub finished_at: String,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("description error: {0}")]
    Description(#[from] SvdError),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Coordinator that ties the loader, miner, and flattener to a store.
pub struct ExtractionPipeline<'a> {
    pub store: &'a dyn RecordStore,
    pub miner: MinerConfig,
}

impl<'a> ExtractionPipeline<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self { store, miner: MinerConfig::default() }
    }

    /// Run the full extraction and replace the store's record set.
    ///
    /// Every fatal path (malformed description, unreachable store, store
    /// mutation failure) reports zero records written by returning the
    /// error before a report exists.
    pub fn run(&self, request: &ExtractionRequest) -> Result<ExtractionReport, PipelineError> {
        self.store.ping()?;
        let started_at = Utc::now().to_rfc3339();

        let map = load_peripheral_map(&request.description_path)?;
        info!("loaded {} peripherals from {}", map.len(), request.description_path.display());

        let overrides: AddressOverrideMap =
            mine_address_overrides(request.manual_path.as_deref(), &self.miner);
        if !overrides.is_empty() {
            info!("mined {} base-address overrides", overrides.len());
        }

        let outcome = flatten_peripherals(&map, &overrides);

        self.store.clear()?;
        let records_written = self.store.insert_many(&outcome.records)?;
        let finished_at = Utc::now().to_rfc3339();

        // Best-effort bookkeeping; never fails a run that already wrote.
        let run = ExtractionRunRecord {
            description_digest: request.description_digest.clone(),
            manual_digest: request.manual_digest.clone(),
            records_written,
            started_at: started_at.clone(),
            finished_at: finished_at.clone(),
        };
        if let Err(e) = self.store.record_run(&run) {
            warn!("failed to record extraction run: {e}");
        }

        Ok(ExtractionReport {
            records_written,
            peripherals_resolved: outcome.resolved,
            peripherals_skipped: outcome.skipped,
            overrides_found: overrides.len(),
            started_at,
            finished_at,
        })
    }
}

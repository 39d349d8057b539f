//! Destination-store integration.
//!
//! The pipeline consumes storage through the [`RecordStore`] trait: a
//! liveness check, `clear`, and `insert_many` — plus optional best-effort
//! run bookkeeping. [`RegisterDb`] is the bundled SQLite implementation;
//! any document- or row-oriented backend satisfying the trait plugs in the
//! same way.

pub mod record_db;
pub mod store;

pub use record_db::{DbError, DbResult, RegisterDb, CURRENT_SCHEMA_VERSION};
pub use store::{ExtractionRunRecord, RecordStore, StoreError};

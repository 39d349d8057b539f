use std::path::Path;

use rusqlite::{params, Connection};
use thiserror::Error;

use crate::db::store::{ExtractionRunRecord, RecordStore, StoreError};
use crate::model::RegisterRecord;

/// Minimum schema version we know how to handle.
///
/// `0` means "no schema yet" (fresh DB).
const MIN_SUPPORTED_SCHEMA_VERSION: i32 = 0;

/// Latest schema version this crate knows about.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Error type for register database operations.
#[derive(Debug, Error)]
pub enum DbError {
    /// Underlying SQLite error.
    #[error("SQLite error: {0}")]
    Sql(#[from] rusqlite::Error),

    /// The database was created with a newer schema version than we support.
    ///
    /// This is intentionally explicit so callers can surface a clear message
    /// instead of silently clobbering or misinterpreting data.
    #[error(
        "Unsupported schema version {found}; supported range is {min_supported}..={max_supported}"
    )]
    UnsupportedSchemaVersion { found: i32, min_supported: i32, max_supported: i32 },
}

/// Convenience result type for DB operations.
pub type DbResult<T> = Result<T, DbError>;

/// SQLite-backed register store.
///
/// This is a thin wrapper around `rusqlite::Connection` that is responsible
/// for:
/// - Opening/creating the DB file.
/// - Applying schema migrations.
/// - Providing small, testable helpers for querying and updating records.
#[derive(Debug)]
pub struct RegisterDb {
    conn: Connection,
}

impl RegisterDb {
    /// Open (or create) a register database at the given path and ensure the
    /// schema exists.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        apply_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Expose a reference to the underlying connection for advanced callers.
    /// For most code, prefer higher-level helpers.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Count of stored register/field records.
    pub fn count_records(&self) -> DbResult<usize> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM registers", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// All stored records in insertion (document) order.
    pub fn list_records(&self) -> DbResult<Vec<RegisterRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT peripheral, description, baseaddress, register, register_description,
                   addressoffset, resetvalue, hexaddress, field, field_description,
                   bitoffset, bitwidth
            FROM registers
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(RegisterRecord {
                peripheral: row.get(0)?,
                description: row.get(1)?,
                base_address: row.get(2)?,
                register: row.get(3)?,
                register_description: row.get(4)?,
                address_offset: row.get(5)?,
                reset_value: row.get(6)?,
                hex_address: row.get(7)?,
                field: row.get(8)?,
                field_description: row.get(9)?,
                bit_offset: row.get(10)?,
                bit_width: row.get(11)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Remove every stored record. Run bookkeeping is kept.
    pub fn clear_records(&self) -> DbResult<()> {
        self.conn.execute("DELETE FROM registers", [])?;
        Ok(())
    }

    /// Insert a full record set inside one transaction; returns the count.
    pub fn insert_records(&self, records: &[RegisterRecord]) -> DbResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO registers (peripheral, description, baseaddress, register,
                                       register_description, addressoffset, resetvalue,
                                       hexaddress, field, field_description, bitoffset, bitwidth)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            )?;
            for record in records {
                stmt.execute(params![
                    record.peripheral,
                    record.description,
                    record.base_address,
                    record.register,
                    record.register_description,
                    record.address_offset,
                    record.reset_value,
                    record.hex_address,
                    record.field,
                    record.field_description,
                    record.bit_offset,
                    record.bit_width,
                ])?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Insert an extraction run record and return its row id.
    pub fn insert_run(&self, record: &ExtractionRunRecord) -> DbResult<i64> {
        self.conn.execute(
            r#"
            INSERT INTO extraction_runs (description_digest, manual_digest, records_written,
                                         started_at, finished_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.description_digest,
                record.manual_digest,
                record.records_written as i64,
                record.started_at,
                record.finished_at
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List extraction runs (ordered by id).
    pub fn list_runs(&self) -> DbResult<Vec<ExtractionRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT description_digest, manual_digest, records_written, started_at, finished_at
            FROM extraction_runs
            ORDER BY id
            "#,
        )?;
        let rows = stmt.query_map([], map_run)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// The most recent extraction run, if any.
    pub fn latest_run(&self) -> DbResult<Option<ExtractionRunRecord>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT description_digest, manual_digest, records_written, started_at, finished_at
            FROM extraction_runs
            ORDER BY id DESC
            LIMIT 1
            "#,
        )?;
        let mut rows = stmt.query_map([], map_run)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}

fn map_run(row: &rusqlite::Row<'_>) -> rusqlite::Result<ExtractionRunRecord> {
    let records_written: i64 = row.get(2)?;
    Ok(ExtractionRunRecord {
        description_digest: row.get(0)?,
        manual_digest: row.get(1)?,
        records_written: records_written as usize,
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
    })
}

impl RecordStore for RegisterDb {
    fn ping(&self) -> Result<(), StoreError> {
        self.conn
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| StoreError::Unreachable(e.to_string()))?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.clear_records().map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn insert_many(&self, records: &[RegisterRecord]) -> Result<usize, StoreError> {
        self.insert_records(records).map_err(|e| StoreError::Backend(e.to_string()))
    }

    fn record_run(&self, run: &ExtractionRunRecord) -> Result<(), StoreError> {
        self.insert_run(run).map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }
}

/// Apply schema migrations to bring the database to the latest version.
///
/// We use `PRAGMA user_version` as the schema version indicator.
///
/// Version map:
/// - 0: no schema
/// - 1: initial schema (registers)
/// - 2: add extraction_runs table
fn apply_migrations(conn: &Connection) -> DbResult<()> {
    let current_version = current_schema_version(conn)?;

    // Reject DBs created with a newer schema than we support.
    if current_version > CURRENT_SCHEMA_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            found: current_version,
            min_supported: MIN_SUPPORTED_SCHEMA_VERSION,
            max_supported: CURRENT_SCHEMA_VERSION,
        });
    }

    if current_version == 0 {
        // Initial schema.
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS registers (
                id                   INTEGER PRIMARY KEY AUTOINCREMENT,
                peripheral           TEXT NOT NULL,
                description          TEXT NOT NULL,
                baseaddress          TEXT NOT NULL,
                register             TEXT NOT NULL,
                register_description TEXT NOT NULL,
                addressoffset        TEXT NOT NULL,
                resetvalue           TEXT NOT NULL,
                hexaddress           TEXT NOT NULL,
                field                TEXT,
                field_description    TEXT,
                bitoffset            INTEGER,
                bitwidth             INTEGER
            );

            PRAGMA user_version = 1;
            COMMIT;
            "#,
        )?;
    }

    if current_version < 2 {
        conn.execute_batch(
            r#"
            BEGIN;
            CREATE TABLE IF NOT EXISTS extraction_runs (
                id                 INTEGER PRIMARY KEY AUTOINCREMENT,
                description_digest TEXT,
                manual_digest      TEXT,
                records_written    INTEGER NOT NULL,
                started_at         TEXT NOT NULL,
                finished_at        TEXT NOT NULL
            );

            PRAGMA user_version = 2;
            COMMIT;
            "#,
        )?;
    }

    Ok(())
}

/// Read the SQLite schema version from `PRAGMA user_version`.
fn current_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    Ok(version)
}

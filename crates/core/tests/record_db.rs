use regmap_core::db::{DbError, ExtractionRunRecord, RecordStore, RegisterDb};
use regmap_core::model::RegisterRecord;

fn sample_record(peripheral: &str, register: &str) -> RegisterRecord {
    RegisterRecord {
        peripheral: peripheral.to_string(),
        description: String::new(),
        base_address: "0X40023C00".to_string(),
        register: register.to_string(),
        register_description: String::new(),
        address_offset: "0X0".to_string(),
        reset_value: "0X0".to_string(),
        hex_address: "0X40023C00".to_string(),
        field: None,
        field_description: None,
        bit_offset: None,
        bit_width: None,
    }
}

#[test]
fn open_creates_schema_and_starts_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = RegisterDb::open(&dir.path().join("registers.db")).expect("open");
    assert_eq!(db.count_records().expect("count"), 0);
    assert!(db.latest_run().expect("latest").is_none());
}

#[test]
fn reopening_an_existing_db_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registers.db");
    {
        let db = RegisterDb::open(&path).expect("first open");
        db.insert_records(&[sample_record("FLASH", "ACR")]).expect("insert");
    }
    let db = RegisterDb::open(&path).expect("second open");
    assert_eq!(db.count_records().expect("count"), 1);
}

#[test]
fn insert_and_list_round_trip_preserves_order_and_nulls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = RegisterDb::open(&dir.path().join("registers.db")).expect("open");

    let with_field = RegisterRecord {
        field: Some("LATENCY".to_string()),
        field_description: Some("Wait states".to_string()),
        bit_offset: Some(0),
        bit_width: Some(3),
        ..sample_record("FLASH", "ACR")
    };
    let without_field = sample_record("RCC", "CR");

    let written =
        db.insert_records(&[with_field.clone(), without_field.clone()]).expect("insert");
    assert_eq!(written, 2);

    let listed = db.list_records().expect("list");
    assert_eq!(listed, vec![with_field, without_field]);
}

#[test]
fn clear_removes_records_but_keeps_run_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = RegisterDb::open(&dir.path().join("registers.db")).expect("open");

    db.insert_records(&[sample_record("FLASH", "ACR")]).expect("insert");
    db.insert_run(&ExtractionRunRecord {
        description_digest: Some("abc123".to_string()),
        manual_digest: None,
        records_written: 1,
        started_at: "2026-01-01T00:00:00Z".to_string(),
        finished_at: "2026-01-01T00:00:01Z".to_string(),
    })
    .expect("insert run");

    db.clear_records().expect("clear");
    assert_eq!(db.count_records().expect("count"), 0);
    assert_eq!(db.list_runs().expect("runs").len(), 1);
}

#[test]
fn latest_run_returns_the_most_recent_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = RegisterDb::open(&dir.path().join("registers.db")).expect("open");

    for (i, digest) in ["first", "second"].iter().enumerate() {
        db.insert_run(&ExtractionRunRecord {
            description_digest: Some(digest.to_string()),
            manual_digest: None,
            records_written: i,
            started_at: format!("2026-01-0{}T00:00:00Z", i + 1),
            finished_at: format!("2026-01-0{}T00:00:01Z", i + 1),
        })
        .expect("insert run");
    }

    let latest = db.latest_run().expect("latest").expect("present");
    assert_eq!(latest.description_digest.as_deref(), Some("second"));
    assert_eq!(latest.records_written, 1);
}

#[test]
fn newer_schema_versions_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("registers.db");
    {
        let db = RegisterDb::open(&path).expect("open");
        db.connection().execute_batch("PRAGMA user_version = 99;").expect("bump version");
    }
    let err = match RegisterDb::open(&path) {
        Err(err) => err,
        Ok(_) => panic!("open should reject schema version 99"),
    };
    assert!(matches!(err, DbError::UnsupportedSchemaVersion { found: 99, .. }), "got {err:?}");
}

#[test]
fn record_store_trait_covers_ping_clear_insert() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db = RegisterDb::open(&dir.path().join("registers.db")).expect("open");
    let store: &dyn RecordStore = &db;

    store.ping().expect("ping");
    let written =
        store.insert_many(&[sample_record("FLASH", "ACR"), sample_record("RCC", "CR")]).expect("insert");
    assert_eq!(written, 2);
    store.clear().expect("clear");
    assert_eq!(db.count_records().expect("count"), 0);
}

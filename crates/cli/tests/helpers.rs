use std::fs;

use regmap::{load_job, sha256_file};
use tempfile::tempdir;

#[test]
fn sha256_file_matches_known_digest() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("input.txt");
    fs::write(&path, b"abc").expect("write");

    let digest = sha256_file(&path).expect("hash");
    assert_eq!(digest, "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad");
}

#[test]
fn sha256_file_fails_for_missing_files() {
    let dir = tempdir().expect("tempdir");
    assert!(sha256_file(&dir.path().join("missing.bin")).is_err());
}

#[test]
fn load_job_parses_yaml_settings() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("job.yaml");
    fs::write(
        &path,
        "svd: stm32f4.svd\nmanual: rm0090.pdf\ndb: registers.db\nmin_embedded_chars: 48\n",
    )
    .expect("write");

    let job = load_job(&path).expect("load");
    assert_eq!(job.svd.as_deref(), Some("stm32f4.svd"));
    assert_eq!(job.manual.as_deref(), Some("rm0090.pdf"));
    assert_eq!(job.db.as_deref(), Some("registers.db"));
    assert_eq!(job.min_embedded_chars, Some(48));
    assert_eq!(job.ocr_dpi, None);
}

#[test]
fn load_job_fails_for_missing_file() {
    let dir = tempdir().expect("tempdir");
    assert!(load_job(&dir.path().join("missing.yaml")).is_err());
}

#[test]
fn load_job_fails_for_unparseable_yaml() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("job.yaml");
    fs::write(&path, "svd: [unclosed").expect("write");
    assert!(load_job(&path).is_err());
}

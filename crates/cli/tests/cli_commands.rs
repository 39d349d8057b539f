use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const DOC: &str = r#"
<peripherals>
  <peripheral>
    <name>FLASH</name>
    <baseAddress>0x40023C00</baseAddress>
    <registers>
      <register><name>ACR</name><addressOffset>0x0</addressOffset></register>
    </registers>
  </peripheral>
  <peripheral derivedFrom="FLASH">
    <name>FLASH_ALT</name>
    <baseAddress>0x40023D00</baseAddress>
  </peripheral>
</peripherals>
"#;

fn regmap() -> Command {
    Command::cargo_bin("regmap").expect("binary built")
}

/// Running with no subcommand prints usage and fails.
#[test]
fn no_subcommand_fails_with_usage() {
    regmap().assert().failure();
}

#[test]
fn help_runs_successfully() {
    regmap().arg("--help").assert().success();
}

/// status against a fresh database reports zero records.
#[test]
fn status_reports_empty_database() {
    let dir = tempdir().expect("tempdir");
    regmap()
        .current_dir(dir.path())
        .args(["status", "--db", "registers.db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Records: 0"));
}

#[test]
fn extract_requires_a_description_document() {
    let dir = tempdir().expect("tempdir");
    regmap().current_dir(dir.path()).arg("extract").assert().failure();
}

#[test]
fn extract_fails_for_missing_description_file() {
    let dir = tempdir().expect("tempdir");
    regmap()
        .current_dir(dir.path())
        .args(["extract", "--svd", "nonexistent.svd", "--db", "registers.db"])
        .assert()
        .failure();
}

/// A missing manual is "no overrides", never an error.
#[test]
fn mine_with_missing_manual_prints_an_empty_map() {
    regmap()
        .args(["mine", "--manual", "/nonexistent/rm0090.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("(none)"));
}

#[test]
fn mine_lists_pairs_from_a_text_dump() {
    let dir = tempdir().expect("tempdir");
    let dump = dir.path().join("manual.txt");
    fs::write(&dump, "FLASH 0x40023C00\nUSART1 0x40011000\n").expect("write dump");

    regmap()
        .args(["mine", "--text-dump"])
        .arg(&dump)
        .assert()
        .success()
        .stdout(predicate::str::contains("FLASH 0X40023C00"))
        .stdout(predicate::str::contains("USART1 0X40011000"));
}

#[test]
fn resolve_prints_the_merged_peripheral() {
    let dir = tempdir().expect("tempdir");
    let svd = dir.path().join("chip.svd");
    fs::write(&svd, DOC).expect("write svd");

    regmap()
        .args(["resolve", "--peripheral", "FLASH_ALT", "--svd"])
        .arg(&svd)
        .assert()
        .success()
        .stdout(predicate::str::contains("FLASH_ALT"))
        .stdout(predicate::str::contains("0X40023D00"))
        .stdout(predicate::str::contains("ACR"));
}

#[test]
fn resolve_fails_for_unknown_peripherals() {
    let dir = tempdir().expect("tempdir");
    let svd = dir.path().join("chip.svd");
    fs::write(&svd, DOC).expect("write svd");

    regmap()
        .args(["resolve", "--peripheral", "GHOST", "--svd"])
        .arg(&svd)
        .assert()
        .failure();
}

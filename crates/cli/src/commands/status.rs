use std::path::Path;

use anyhow::{Context, Result};
use regmap_core::db::RegisterDb;

/// Show record count and latest run provenance for a register database.
pub fn status_command(db: &str, json: bool) -> Result<()> {
    let store = RegisterDb::open(Path::new(db))
        .with_context(|| format!("Failed to open register database at {db}"))?;

    let records = store.count_records().context("Failed to count records")?;
    let latest = store.latest_run().context("Failed to read extraction runs")?;

    if json {
        let payload = serde_json::json!({
            "records": records,
            "latest_run": latest,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("Register database: {db}");
    println!("  Records: {records}");
    match latest {
        Some(run) => {
            println!("  Latest run:");
            println!("    Records written: {}", run.records_written);
            println!("    Started:  {}", run.started_at);
            println!("    Finished: {}", run.finished_at);
            if let Some(digest) = &run.description_digest {
                println!("    Description SHA-256: {digest}");
            }
            if let Some(digest) = &run.manual_digest {
                println!("    Manual SHA-256: {digest}");
            }
        }
        None => println!("  Latest run: (none recorded)"),
    }

    Ok(())
}

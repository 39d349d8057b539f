use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use regmap_core::db::RegisterDb;
use regmap_core::mining::MinerConfig;
use regmap_core::pipeline::{ExtractionPipeline, ExtractionRequest};

use crate::{load_job, sha256_file, ExtractJob};

/// Run the full extraction pipeline against a register database.
pub fn extract_command(
    svd: Option<String>,
    manual: Option<String>,
    db: Option<String>,
    config: Option<String>,
    text_dump: Option<String>,
    min_embedded_chars: Option<usize>,
    ocr_dpi: Option<u32>,
    json: bool,
) -> Result<()> {
    let job = match config {
        Some(path) => load_job(Path::new(&path))?,
        None => ExtractJob::default(),
    };

    let svd = svd.or(job.svd).ok_or_else(|| {
        anyhow!("No description document given; pass --svd or set `svd` in the job file")
    })?;
    let manual = manual.or(job.manual);
    let db_path = db.or(job.db).unwrap_or_else(|| "registers.db".to_string());

    let mut miner = MinerConfig::default();
    if let Some(chars) = min_embedded_chars.or(job.min_embedded_chars) {
        miner.min_embedded_chars = chars;
    }
    if let Some(dpi) = ocr_dpi.or(job.ocr_dpi) {
        miner.ocr_dpi = dpi;
    }
    miner.text_dump = text_dump.or(job.text_dump).map(PathBuf::from);

    let svd_path = PathBuf::from(&svd);
    let manual_path = manual.map(PathBuf::from);

    let store = RegisterDb::open(Path::new(&db_path))
        .with_context(|| format!("Failed to open register database at {db_path}"))?;

    let request = ExtractionRequest {
        description_path: svd_path.clone(),
        manual_path: manual_path.clone(),
        // Digests are provenance only; an unreadable input surfaces through
        // the pipeline itself, not here.
        description_digest: sha256_file(&svd_path).ok(),
        manual_digest: manual_path
            .as_deref()
            .filter(|p| p.is_file())
            .and_then(|p| sha256_file(p).ok()),
    };

    let pipeline = ExtractionPipeline { store: &store, miner };
    let report = pipeline.run(&request).context("Extraction run failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Extraction complete:");
        println!("  Records written: {}", report.records_written);
        println!("  Peripherals resolved: {}", report.peripherals_resolved);
        if !report.peripherals_skipped.is_empty() {
            println!("  Peripherals skipped: {}", report.peripherals_skipped.join(", "));
        }
        println!("  Overrides mined: {}", report.overrides_found);
        println!("  DB: {db_path}");
    }

    Ok(())
}

use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub mod commands;

/// A YAML job file for the `extract` command, carrying the same settings as
/// the command-line flags. Flags win over the file when both are given.
///
/// ```yaml
/// svd: stm32f4.svd
/// manual: rm0090.pdf
/// db: registers.db
/// min_embedded_chars: 32
/// ocr_dpi: 300
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractJob {
    pub svd: Option<String>,
    pub manual: Option<String>,
    pub db: Option<String>,
    pub text_dump: Option<String>,
    pub min_embedded_chars: Option<usize>,
    pub ocr_dpi: Option<u32>,
}

/// Load and parse an extract job file.
pub fn load_job(path: &Path) -> Result<ExtractJob> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file at {}", path.display()))?;
    let job: ExtractJob = serde_yaml::from_str(&text)
        .with_context(|| format!("Failed to parse job file at {}", path.display()))?;
    Ok(job)
}

/// Compute the SHA-256 hash of a file and return it as a hex string.
///
/// Used to record input-document provenance alongside an extraction run.
pub fn sha256_file(path: &Path) -> Result<String> {
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open file for hashing: {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];

    loop {
        let n = reader
            .read(&mut buf)
            .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    Ok(format!("{:x}", digest))
}

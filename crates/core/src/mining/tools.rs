//! External-tool plumbing for the miner: poppler for text extraction and
//! rasterization, tesseract for optical character recognition.
//!
//! Every tool resolves through an environment variable first so deployments
//! can pin exact binaries:
//! - `REGMAP_PDFINFO_BIN` (default `pdfinfo`)
//! - `REGMAP_PDFTOTEXT_BIN` (default `pdftotext`)
//! - `REGMAP_PDFTOPPM_BIN` (default `pdftoppm`)
//! - `REGMAP_TESSERACT_BIN` (default `tesseract`)
//!
//! All helpers return `Option`: a missing tool or a failing invocation
//! means "no text from this path", which the caller treats as a degraded
//! page, not an error.

use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

fn resolve_tool(var: &str, default: &str) -> PathBuf {
    env::var_os(var).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(default))
}

/// Number of pages in the manual, via `pdfinfo`.
pub fn page_count(manual: &Path) -> Option<usize> {
    let bin = resolve_tool("REGMAP_PDFINFO_BIN", "pdfinfo");
    let output = Command::new(&bin).arg(manual).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|rest| rest.trim().parse().ok())
}

/// One page of the embedded text layer, via `pdftotext`.
pub fn embedded_page_text(manual: &Path, page: usize) -> Option<String> {
    let bin = resolve_tool("REGMAP_PDFTOTEXT_BIN", "pdftotext");
    let page = page.to_string();
    let output = Command::new(&bin)
        .args(["-q", "-f", &page, "-l", &page])
        .arg(manual)
        .arg("-")
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Rasterize one page and recover its text through OCR.
///
/// The page image lives in a temporary directory that is dropped as soon as
/// the recognized text has been read.
pub fn ocr_page_text(manual: &Path, page: usize, dpi: u32) -> Option<String> {
    let scratch = tempfile::tempdir().ok()?;
    let prefix = scratch.path().join("page");

    let pdftoppm = resolve_tool("REGMAP_PDFTOPPM_BIN", "pdftoppm");
    let page = page.to_string();
    let status = Command::new(&pdftoppm)
        .args(["-png", "-singlefile", "-r", &dpi.to_string(), "-f", &page, "-l", &page])
        .arg(manual)
        .arg(&prefix)
        .status()
        .ok()?;
    if !status.success() {
        return None;
    }

    let tesseract = resolve_tool("REGMAP_TESSERACT_BIN", "tesseract");
    let output = Command::new(&tesseract).arg(prefix.with_extension("png")).arg("stdout").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).into_owned();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

//! Best-effort address mining from the reference manual.
//!
//! The manual is a paginated PDF with no fixed schema; the only assumption
//! is that peripheral identifiers appear near 6-8 hex-digit base addresses.
//! Per page we take the embedded text layer when it looks readable and fall
//! back to rasterize-and-OCR when it does not. The combined text is scanned
//! for identifier/address pairs where the last occurrence per identifier
//! wins, since manuals repeat their memory-map tables and the canonical
//! value is assumed to be the last stated one.
//!
//! The output is advisory: false positives and negatives are by design, and
//! nothing in here may block the deterministic structured-parse path. A
//! missing manual, a missing tool, or a page that yields no text all
//! degrade to "fewer overrides", never to an error.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;

use crate::model::AddressOverrideMap;

mod tools;

/// Tuning knobs for the miner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerConfig {
    /// Pages whose embedded text layer is shorter than this are treated as
    /// image-only and routed through OCR.
    pub min_embedded_chars: usize,
    /// Rasterization resolution for the OCR fallback.
    pub ocr_dpi: u32,
    /// Use a pre-extracted plain-text dump instead of reading the PDF.
    /// Also settable via `REGMAP_TEXT_DUMP`; saves repeated OCR passes and
    /// gives tests a seam that needs no external tools.
    pub text_dump: Option<PathBuf>,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self { min_embedded_chars: 32, ocr_dpi: 300, text_dump: None }
    }
}

/// Mine peripheral base-address overrides from the reference manual.
///
/// Returns an empty map when the manual is absent or unreadable; the
/// override source is optional by contract.
pub fn mine_address_overrides(manual: Option<&Path>, config: &MinerConfig) -> AddressOverrideMap {
    if let Some(dump) = text_dump_path(config) {
        return match fs::read_to_string(&dump) {
            Ok(text) => scan_address_pairs(&text),
            Err(e) => {
                warn!("failed to read text dump {}: {e}", dump.display());
                AddressOverrideMap::new()
            }
        };
    }

    let manual = match manual {
        Some(path) if path.is_file() => path,
        _ => return AddressOverrideMap::new(),
    };

    let pages = match tools::page_count(manual) {
        Some(pages) => pages,
        None => {
            warn!("could not determine page count for {}; no overrides mined", manual.display());
            return AddressOverrideMap::new();
        }
    };

    let mut text = String::new();
    for page in 1..=pages {
        match page_text(manual, page, config) {
            Some(page_text) => {
                text.push_str(&page_text);
                text.push('\n');
            }
            None => debug!("page {page} of {} yielded no text", manual.display()),
        }
    }
    scan_address_pairs(&text)
}

/// Extract one page's text: embedded layer when readable, OCR otherwise.
///
/// A degenerate embedded layer that OCR also fails to improve on is still
/// better than nothing, so it is returned as a last resort.
fn page_text(manual: &Path, page: usize, config: &MinerConfig) -> Option<String> {
    let embedded = tools::embedded_page_text(manual, page).unwrap_or_default();
    if embedded.trim().len() >= config.min_embedded_chars {
        return Some(embedded);
    }
    if let Some(recovered) = tools::ocr_page_text(manual, page, config.ocr_dpi) {
        return Some(recovered);
    }
    if embedded.trim().is_empty() {
        None
    } else {
        Some(embedded)
    }
}

fn text_dump_path(config: &MinerConfig) -> Option<PathBuf> {
    config.text_dump.clone().or_else(|| env::var_os("REGMAP_TEXT_DUMP").map(PathBuf::from))
}

lazy_static! {
    /// An identifier token followed by up to a few non-word separators and a
    /// 6-8 digit hex literal.
    static ref ADDRESS_PAIR: Regex =
        Regex::new(r"([A-Z][A-Z0-9_]+)\W{0,8}0[xX]([0-9A-Fa-f]{6,8})").unwrap();
}

/// Scan mined text for identifier/address pairs.
///
/// Later occurrences overwrite earlier ones. Names are uppercased to match
/// the flattener's lookup; addresses keep their mined digits behind the
/// canonical `0X` prefix.
pub fn scan_address_pairs(text: &str) -> AddressOverrideMap {
    let mut map = AddressOverrideMap::new();
    for capture in ADDRESS_PAIR.captures_iter(text) {
        map.insert(capture[1].to_uppercase(), format!("0X{}", capture[2].to_uppercase()));
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_picks_up_identifier_address_pairs() {
        let map = scan_address_pairs("FLASH . . . 0x40023C00\nUSART1 : 0x40011000");
        assert_eq!(map.get("FLASH").map(String::as_str), Some("0X40023C00"));
        assert_eq!(map.get("USART1").map(String::as_str), Some("0X40011000"));
    }

    #[test]
    fn scan_keeps_the_last_occurrence_per_identifier() {
        let map = scan_address_pairs("FLASH 0x40000000\n...\nFLASH 0x40023C00");
        assert_eq!(map.get("FLASH").map(String::as_str), Some("0X40023C00"));
    }

    #[test]
    fn scan_ignores_short_and_overlong_separators() {
        // Five hex digits is below the 6-digit minimum.
        assert!(scan_address_pairs("FLASH 0x12345").is_empty());
        // Ten separator characters exceed the window.
        assert!(scan_address_pairs("FLASH ......... 0x40023C00").is_empty());
    }

    #[test]
    fn scan_uppercases_mined_names_and_digits() {
        let map = scan_address_pairs("GPIOA 0x40020abc");
        assert_eq!(map.get("GPIOA").map(String::as_str), Some("0X40020ABC"));
    }
}

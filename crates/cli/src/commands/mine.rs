use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use regmap_core::mining::{mine_address_overrides, MinerConfig};

/// Mine base-address overrides and print them, name-sorted for stable
/// output.
pub fn mine_command(
    manual: Option<String>,
    text_dump: Option<String>,
    min_embedded_chars: Option<usize>,
    ocr_dpi: Option<u32>,
    json: bool,
) -> Result<()> {
    let mut miner = MinerConfig::default();
    if let Some(chars) = min_embedded_chars {
        miner.min_embedded_chars = chars;
    }
    if let Some(dpi) = ocr_dpi {
        miner.ocr_dpi = dpi;
    }
    miner.text_dump = text_dump.map(PathBuf::from);

    let overrides = mine_address_overrides(manual.as_deref().map(Path::new), &miner);
    let sorted: BTreeMap<String, String> = overrides.into_iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&sorted)?);
    } else {
        println!("Mined overrides ({}):", sorted.len());
        if sorted.is_empty() {
            println!("  (none)");
            return Ok(());
        }
        for (name, address) in sorted {
            println!("  - {name} {address}");
        }
    }

    Ok(())
}

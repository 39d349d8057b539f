use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regmap_core::model::format_hex;
use regmap_core::svd::{load_peripheral_map, resolve_peripheral};

/// Resolve one peripheral's inheritance chain and print the merged tree.
pub fn resolve_command(svd: &str, peripheral: &str, json: bool) -> Result<()> {
    let map = load_peripheral_map(Path::new(svd))
        .with_context(|| format!("Failed to load description document at {svd}"))?;

    let resolved = resolve_peripheral(&map, peripheral).ok_or_else(|| {
        anyhow!(
            "Could not resolve peripheral {peripheral}: unknown name, unknown base, or derivation cycle"
        )
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }

    println!("Peripheral: {}", resolved.name);
    if let Some(desc) = &resolved.description {
        println!("  Description: {desc}");
    }
    match resolved.base_address {
        Some(base) => println!("  Base address: {}", format_hex(base)),
        None => println!("  Base address: (none declared)"),
    }
    println!("  Registers ({}):", resolved.registers.len());
    for register in &resolved.registers {
        println!(
            "    - {} @ {} ({} fields)",
            register.name,
            format_hex(register.address_offset),
            register.fields.len()
        );
    }
    if !resolved.clusters.is_empty() {
        println!("  Clusters ({}):", resolved.clusters.len());
        for cluster in &resolved.clusters {
            println!(
                "    - {} @ {} ({} registers)",
                cluster.name,
                format_hex(cluster.address_offset),
                cluster.registers.len()
            );
        }
    }

    Ok(())
}

//! Address and field flattening: resolved peripheral trees in, flat records
//! out.
//!
//! For every peripheral in document order the flattener resolves
//! inheritance, settles the effective base address, and walks registers
//! directly under the peripheral plus registers inside clusters found at
//! any depth. One record per field; one record with null field columns for
//! a field-less register.

use log::{debug, warn};

use crate::model::{
    format_hex, AddressOverrideMap, ClusterNode, PeripheralMap, RegisterNode, RegisterRecord,
    ResolvedPeripheral,
};
use crate::svd::parse_number;
use crate::svd::resolve::resolve_peripheral;

/// Result of one flattening pass over the peripheral map.
#[derive(Debug, Clone, Default)]
pub struct FlattenOutcome {
    /// Flat records in document declaration order.
    pub records: Vec<RegisterRecord>,
    /// Count of peripherals that resolved successfully.
    pub resolved: usize,
    /// Names of peripherals skipped over unresolvable inheritance.
    pub skipped: Vec<String>,
}

/// Flatten every peripheral in the map into records.
///
/// A peripheral whose inheritance cannot be resolved (unknown base or a
/// derivation cycle) is skipped with a warning; the rest of the map still
/// flattens.
pub fn flatten_peripherals(
    map: &PeripheralMap,
    overrides: &AddressOverrideMap,
) -> FlattenOutcome {
    let mut outcome = FlattenOutcome::default();
    for name in map.names() {
        let resolved = match resolve_peripheral(map, name) {
            Some(resolved) => resolved,
            None => {
                warn!("skipping peripheral {name}: unresolvable inheritance (unknown base or cycle)");
                outcome.skipped.push(name.to_string());
                continue;
            }
        };
        outcome.resolved += 1;

        let base = effective_base_address(&resolved, overrides);
        for register in &resolved.registers {
            push_register_records(
                &mut outcome.records,
                &resolved,
                base,
                register,
                register.name.to_uppercase(),
                register.address_offset,
            );
        }
        for cluster in collect_clusters(&resolved.clusters) {
            for register in &cluster.registers {
                push_register_records(
                    &mut outcome.records,
                    &resolved,
                    base,
                    register,
                    format!("{}_{}", cluster.name.to_uppercase(), register.name.to_uppercase()),
                    cluster.address_offset + register.address_offset,
                );
            }
        }
    }
    outcome
}

/// Settle the one base address a peripheral's records are computed from.
///
/// Precedence: reference-manual override for the UPPERCASED name, then the
/// declared (possibly inherited) base address, then zero. The override
/// silently wins over a conflicting declared value; the reconciliation is
/// only surfaced as a debug line.
pub fn effective_base_address(
    peripheral: &ResolvedPeripheral,
    overrides: &AddressOverrideMap,
) -> u64 {
    if let Some(mined) = overrides.get(&peripheral.name.to_uppercase()) {
        if let Some(value) = parse_number(mined) {
            if peripheral.base_address.is_some() && peripheral.base_address != Some(value) {
                debug!(
                    "peripheral {}: using mined base {} over declared {}",
                    peripheral.name,
                    mined,
                    format_hex(peripheral.base_address.unwrap_or(0))
                );
            }
            return value;
        }
    }
    peripheral.base_address.unwrap_or(0)
}

/// Clusters at any nesting depth, document order, parents before children.
///
/// Each cluster is flattened against its own `address_offset` only; nested
/// clusters do not accumulate ancestor offsets.
fn collect_clusters(clusters: &[ClusterNode]) -> Vec<&ClusterNode> {
    let mut out = Vec::new();
    for cluster in clusters {
        out.push(cluster);
        out.extend(collect_clusters(&cluster.clusters));
    }
    out
}

fn push_register_records(
    records: &mut Vec<RegisterRecord>,
    peripheral: &ResolvedPeripheral,
    base: u64,
    register: &RegisterNode,
    register_name: String,
    offset: u64,
) {
    let template = RegisterRecord {
        peripheral: peripheral.name.clone(),
        description: peripheral.description.clone().unwrap_or_default(),
        base_address: format_hex(base),
        register: register_name,
        register_description: register.description.clone().unwrap_or_default(),
        address_offset: format_hex(offset),
        reset_value: format_hex(register.reset_value.unwrap_or(0)),
        hex_address: format_hex(base + offset),
        field: None,
        field_description: None,
        bit_offset: None,
        bit_width: None,
    };

    if register.fields.is_empty() {
        records.push(template);
        return;
    }
    for field in &register.fields {
        records.push(RegisterRecord {
            field: Some(field.name.to_uppercase()),
            field_description: field.description.clone(),
            bit_offset: Some(field.bit_offset),
            bit_width: Some(field.bit_width),
            ..template.clone()
        });
    }
}

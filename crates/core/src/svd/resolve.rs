//! Inheritance resolution for `derivedFrom` peripheral references.
//!
//! Resolution is a pure function over the immutable peripheral map: each
//! call returns a freshly built tree and threads an explicit visited set
//! through the recursion for cycle detection. No memoization across
//! peripherals; the description set is small and correctness matters more
//! than repeated-work avoidance.

use std::collections::HashSet;

use crate::model::{PeripheralMap, PeripheralNode, ResolvedPeripheral};

/// Expand a peripheral's inheritance chain into a fully merged tree.
///
/// Returns `None` when the name is unknown, when the chain references an
/// unknown base, or when the chain cycles back on itself (a peripheral may
/// not derive, even transitively, from itself). Callers treat `None` as
/// "skip this peripheral", never as a fatal error.
pub fn resolve_peripheral(map: &PeripheralMap, name: &str) -> Option<ResolvedPeripheral> {
    resolve_with(map, name, &mut HashSet::new())
}

fn resolve_with(
    map: &PeripheralMap,
    name: &str,
    visiting: &mut HashSet<String>,
) -> Option<ResolvedPeripheral> {
    // Cycle guard: a name already on the resolution path ends the chain.
    if !visiting.insert(name.to_string()) {
        return None;
    }

    let node = map.get(name)?;
    match &node.derived_from {
        None => Some(identity(node)),
        Some(base_name) => {
            let base = resolve_with(map, base_name, visiting)?;
            Some(merge(base, node))
        }
    }
}

/// A peripheral with no base resolves to itself unchanged.
fn identity(node: &PeripheralNode) -> ResolvedPeripheral {
    ResolvedPeripheral {
        name: node.name.clone(),
        description: node.description.clone(),
        base_address: node.base_address,
        registers: node.registers.clone(),
        clusters: node.clusters.clone(),
    }
}

/// Merge a deriving peripheral over its resolved base.
///
/// Own identity always wins: `name` is the deriving peripheral's, and
/// `base_address`/`description` are the deriving peripheral's when declared.
/// Own non-empty `registers` replace the base's wholesale, likewise
/// `clusters` — never a per-register merge. Each collection is judged
/// independently, so a peripheral may redeclare its registers while still
/// inheriting the base's clusters.
fn merge(base: ResolvedPeripheral, node: &PeripheralNode) -> ResolvedPeripheral {
    ResolvedPeripheral {
        name: node.name.clone(),
        description: node.description.clone().or(base.description),
        base_address: node.base_address.or(base.base_address),
        registers: if node.registers.is_empty() {
            base.registers
        } else {
            node.registers.clone()
        },
        clusters: if node.clusters.is_empty() { base.clusters } else { node.clusters.clone() },
    }
}

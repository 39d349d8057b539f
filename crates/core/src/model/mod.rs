//! Core data model for chip descriptions and the flat records they produce.
//!
//! The tree side (`PeripheralNode` and friends) mirrors the shape of the
//! vendor description document: peripherals own registers and clusters,
//! clusters own registers (and possibly nested clusters), registers own
//! bit-fields. The flat side (`RegisterRecord`) is the persisted unit the
//! pipeline writes to the destination store.
//!
//! Everything here is a plain value type; the tree is rebuilt from the
//! source documents on every run and never persisted directly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A peripheral subtree as declared in the description document.
///
/// `derived_from` is the raw inheritance reference; it is resolved (and
/// removed) by the inheritance resolver before flattening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeripheralNode {
    pub name: String,
    pub description: Option<String>,
    /// Declared base address; may be absent when the peripheral relies on
    /// inheritance or on the reference-manual override.
    pub base_address: Option<u64>,
    /// Name of the peripheral this one derives its layout from, if any.
    pub derived_from: Option<String>,
    pub registers: Vec<RegisterNode>,
    pub clusters: Vec<ClusterNode>,
}

/// A named group of registers sharing an additional address offset relative
/// to the enclosing peripheral's base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterNode {
    pub name: String,
    pub address_offset: u64,
    pub registers: Vec<RegisterNode>,
    pub clusters: Vec<ClusterNode>,
}

/// A fixed-width addressable unit within a peripheral or cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterNode {
    pub name: String,
    pub description: Option<String>,
    /// Offset relative to the enclosing cluster or peripheral.
    pub address_offset: u64,
    pub reset_value: Option<u64>,
    pub fields: Vec<FieldNode>,
}

/// A named bit-range within a register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub description: Option<String>,
    pub bit_offset: u32,
    pub bit_width: u32,
}

/// A peripheral tree with its inheritance fully expanded.
///
/// Identical in shape to [`PeripheralNode`] minus the `derived_from`
/// reference; produced once per peripheral per run by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPeripheral {
    pub name: String,
    pub description: Option<String>,
    pub base_address: Option<u64>,
    pub registers: Vec<RegisterNode>,
    pub clusters: Vec<ClusterNode>,
}

/// Mapping from UPPERCASED peripheral name to a hex base-address string
/// mined from the reference manual. Built once per run; read-only after.
pub type AddressOverrideMap = HashMap<String, String>;

/// Document-ordered collection of peripherals with a by-name index.
///
/// Output record order follows document declaration order, so peripherals
/// live in a `Vec` with names indexed on the side. A duplicate name
/// replaces the earlier node in place.
#[derive(Debug, Clone, Default)]
pub struct PeripheralMap {
    peripherals: Vec<PeripheralNode>,
    index: HashMap<String, usize>,
}

impl PeripheralMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: PeripheralNode) {
        match self.index.get(&node.name) {
            Some(&i) => self.peripherals[i] = node,
            None => {
                self.index.insert(node.name.clone(), self.peripherals.len());
                self.peripherals.push(node);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&PeripheralNode> {
        self.index.get(name).map(|&i| &self.peripherals[i])
    }

    /// Peripheral names in document declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.peripherals.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PeripheralNode> {
        self.peripherals.iter()
    }

    pub fn len(&self) -> usize {
        self.peripherals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peripherals.is_empty()
    }
}

/// The persisted unit: one row per bit-field, or one row per register when
/// the register declares no fields (field columns null in that case).
///
/// Serialized names match the destination store's column vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRecord {
    #[serde(rename = "PERIPHERAL")]
    pub peripheral: String,
    #[serde(rename = "DESCRIPTION")]
    pub description: String,
    #[serde(rename = "BASEADDRESS")]
    pub base_address: String,
    #[serde(rename = "REGISTER")]
    pub register: String,
    #[serde(rename = "REGISTER_DESCRIPTION")]
    pub register_description: String,
    #[serde(rename = "ADDRESSOFFSET")]
    pub address_offset: String,
    #[serde(rename = "RESETVALUE")]
    pub reset_value: String,
    #[serde(rename = "HEXADDRESS")]
    pub hex_address: String,
    #[serde(rename = "FIELD")]
    pub field: Option<String>,
    #[serde(rename = "FIELD_DESCRIPTION")]
    pub field_description: Option<String>,
    #[serde(rename = "BITOFFSET")]
    pub bit_offset: Option<u32>,
    #[serde(rename = "BITWIDTH")]
    pub bit_width: Option<u32>,
}

/// Render an address value the way every record column does: `0X` prefix,
/// uppercase hex digits.
pub fn format_hex(value: u64) -> String {
    format!("0X{:X}", value)
}

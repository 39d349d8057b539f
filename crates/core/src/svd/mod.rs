//! Loader for the vendor chip-description document.
//!
//! The description is an SVD-style XML tree: a `<peripherals>` collection of
//! `<peripheral>` elements, each carrying scalar children (`name`,
//! `baseAddress`, `description`), an optional `derivedFrom` attribute, and
//! `<register>`/`<cluster>` children grouped under `<registers>` (clusters
//! may also appear under a separate `<clusters>` collection).
//!
//! Parsing is deliberately tolerant: the only fatal shape error is a
//! document that is not well-formed XML or has no `<peripherals>`
//! collection at all. Individual elements missing a name are skipped with a
//! warning; unparseable optional numbers read as absent and unparseable
//! offsets as zero.

use std::fs;
use std::path::Path;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use crate::model::{ClusterNode, FieldNode, PeripheralMap, PeripheralNode, RegisterNode};

pub mod resolve;

pub use resolve::resolve_peripheral;

/// Error type for description-document loading.
#[derive(Debug, Error)]
pub enum SvdError {
    /// The document cannot be read from disk.
    #[error("failed to read description document: {0}")]
    Io(#[from] std::io::Error),

    /// The document does not have the expected peripheral/register/field
    /// tree shape.
    #[error("malformed description document: {0}")]
    Malformed(String),
}

/// Convenience result type for loader operations.
pub type SvdResult<T> = Result<T, SvdError>;

/// Load and parse a description document from disk.
pub fn load_peripheral_map(path: &Path) -> SvdResult<PeripheralMap> {
    let text = fs::read_to_string(path)?;
    parse_peripheral_map(&text)
}

/// Parse a description document into a document-ordered peripheral map.
///
/// Fails with [`SvdError::Malformed`] when the text is not well-formed XML
/// or contains no `<peripherals>` collection.
pub fn parse_peripheral_map(text: &str) -> SvdResult<PeripheralMap> {
    let root = parse_element_tree(text)?;
    let peripherals = find_descendant(&root, "peripherals").ok_or_else(|| {
        SvdError::Malformed("document has no <peripherals> collection".to_string())
    })?;

    let mut map = PeripheralMap::new();
    for elem in peripherals.children_named("peripheral") {
        match peripheral_from_element(elem) {
            Some(node) => map.insert(node),
            None => warn!("skipping <peripheral> element with no name"),
        }
    }
    Ok(map)
}

/// Parse a numeric literal the way the description document writes them:
/// `0x`/`0X`-prefixed hex or plain decimal.
pub fn parse_number(text: &str) -> Option<u64> {
    let text = text.trim();
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => text.parse::<u64>().ok(),
    }
}

fn peripheral_from_element(elem: &XmlElement) -> Option<PeripheralNode> {
    let name = scalar(elem, "name")?;
    let (registers, clusters) = collect_members(elem);
    Some(PeripheralNode {
        name,
        description: scalar(elem, "description"),
        base_address: scalar(elem, "baseAddress").and_then(|s| parse_number(&s)),
        derived_from: elem.attr("derivedFrom").map(str::to_string),
        registers,
        clusters,
    })
}

/// Gather `<register>` and `<cluster>` children of a peripheral or cluster:
/// directly, under a `<registers>` wrapper, or under a `<clusters>` wrapper.
fn collect_members(elem: &XmlElement) -> (Vec<RegisterNode>, Vec<ClusterNode>) {
    let mut registers = Vec::new();
    let mut clusters = Vec::new();
    for child in &elem.children {
        match child.name.as_str() {
            "register" => registers.extend(register_from_element(child)),
            "cluster" => clusters.extend(cluster_from_element(child)),
            "registers" | "clusters" => {
                let (r, c) = collect_members(child);
                registers.extend(r);
                clusters.extend(c);
            }
            _ => {}
        }
    }
    (registers, clusters)
}

fn register_from_element(elem: &XmlElement) -> Option<RegisterNode> {
    let name = match scalar(elem, "name") {
        Some(name) => name,
        None => {
            warn!("skipping <register> element with no name");
            return None;
        }
    };
    let fields = elem
        .child("fields")
        .map(|fields| fields.children_named("field").filter_map(field_from_element).collect())
        .unwrap_or_default();
    Some(RegisterNode {
        name,
        description: scalar(elem, "description"),
        address_offset: scalar(elem, "addressOffset").and_then(|s| parse_number(&s)).unwrap_or(0),
        reset_value: scalar(elem, "resetValue").and_then(|s| parse_number(&s)),
        fields,
    })
}

fn field_from_element(elem: &XmlElement) -> Option<FieldNode> {
    let name = match scalar(elem, "name") {
        Some(name) => name,
        None => {
            warn!("skipping <field> element with no name");
            return None;
        }
    };
    Some(FieldNode {
        name,
        description: scalar(elem, "description"),
        bit_offset: scalar(elem, "bitOffset").and_then(|s| parse_number(&s)).unwrap_or(0) as u32,
        bit_width: scalar(elem, "bitWidth").and_then(|s| parse_number(&s)).unwrap_or(0) as u32,
    })
}

fn cluster_from_element(elem: &XmlElement) -> Option<ClusterNode> {
    let name = match scalar(elem, "name") {
        Some(name) => name,
        None => {
            warn!("skipping <cluster> element with no name");
            return None;
        }
    };
    let (registers, clusters) = collect_members(elem);
    Some(ClusterNode {
        name,
        address_offset: scalar(elem, "addressOffset").and_then(|s| parse_number(&s)).unwrap_or(0),
        registers,
        clusters,
    })
}

/// Read a scalar value: child-element text first (the SVD convention),
/// falling back to an attribute of the same name. Empty text reads as
/// absent.
fn scalar(elem: &XmlElement, name: &str) -> Option<String> {
    if let Some(child) = elem.child(name) {
        if !child.text.is_empty() {
            return Some(child.text.clone());
        }
    }
    elem.attr(name).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Minimal element tree folded from the quick-xml event stream.
///
/// The full document comfortably fits in memory and a tree makes the
/// peripheral mapping above straightforward to follow.
#[derive(Debug, Default)]
struct XmlElement {
    name: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }
}

fn parse_element_tree(text: &str) -> SvdResult<XmlElement> {
    let mut reader = Reader::from_str(text);
    // Synthetic root so the document element has a parent to land in.
    let mut stack = vec![XmlElement::default()];

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => stack.push(element_from_start(&start)?),
            Ok(Event::Empty(start)) => {
                let elem = element_from_start(&start)?;
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(elem);
                }
            }
            Ok(Event::Text(t)) => {
                let unescaped = t
                    .unescape()
                    .map_err(|e| SvdError::Malformed(format!("bad text content: {e}")))?;
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(unescaped.trim());
                }
            }
            Ok(Event::CData(t)) => {
                let raw = String::from_utf8_lossy(&t).into_owned();
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(raw.trim());
                }
            }
            Ok(Event::End(_)) => {
                let elem = match stack.pop() {
                    Some(elem) => elem,
                    None => {
                        return Err(SvdError::Malformed("unbalanced closing tag".to_string()));
                    }
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(elem),
                    None => {
                        return Err(SvdError::Malformed("unbalanced closing tag".to_string()));
                    }
                }
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, processing instructions, doctypes.
            Ok(_) => {}
            Err(e) => {
                return Err(SvdError::Malformed(format!("not well-formed XML: {e}")));
            }
        }
    }

    if stack.len() != 1 {
        return Err(SvdError::Malformed("unclosed element at end of document".to_string()));
    }
    // The synthetic root; the document element is among its children.
    Ok(stack.remove(0))
}

fn element_from_start(start: &BytesStart<'_>) -> SvdResult<XmlElement> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr
            .map_err(|e| SvdError::Malformed(format!("bad attribute in <{name}>: {e}")))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SvdError::Malformed(format!("bad attribute value in <{name}>: {e}")))?
            .into_owned();
        attrs.push((key, value));
    }
    Ok(XmlElement { name, attrs, children: Vec::new(), text: String::new() })
}

fn find_descendant<'a>(elem: &'a XmlElement, name: &str) -> Option<&'a XmlElement> {
    if elem.name == name {
        return Some(elem);
    }
    elem.children.iter().find_map(|c| find_descendant(c, name))
}

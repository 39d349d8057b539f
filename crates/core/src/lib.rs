//! regmap-core
//!
//! Core library for the register-map extraction pipeline.
//!
//! This crate turns a vendor chip-description document (an SVD-style XML
//! with a `derivedFrom` inheritance mechanism) plus an unstructured
//! reference manual (PDF) into a flat set of records describing every
//! memory-mapped register and bit-field of a microcontroller family:
//! loading (`svd`), inheritance resolution (`svd::resolve`), best-effort
//! address mining with an OCR fallback (`mining`), address/field
//! flattening (`flatten`), storage (`db`), and orchestration (`pipeline`).
//!
//! The goal is to keep all substantive logic here so it is fully testable
//! and reusable from multiple frontends (CLI, service wrappers, etc.).

pub mod db;
pub mod flatten;
pub mod mining;
pub mod model;
pub mod pipeline;
pub mod svd;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Inventory manifest schema and fetch layer.
//!
//! A manifest is an externally produced JSON payload describing transferred
//! or shipped inventory items. External systems disagree wildly on key
//! names and field types, so the schema here is deliberately permissive:
//! every field is optional, common key variants are mapped through serde
//! aliases, and numeric fields tolerate string encodings. Malformed items
//! never fail the whole payload — the matching layer decides what is
//! usable per item.

mod error;
mod fetch;
mod types;

pub use error::ManifestError;
pub use fetch::{validate_locator, FetchConfig, HttpManifestSource, ManifestSource};
pub use types::{LabResults, ManifestItem, ManifestPayload, PotencyResult};

/// Parse a manifest payload from raw JSON text.
pub fn parse_manifest(body: &str) -> Result<ManifestPayload, ManifestError> {
    serde_json::from_str(body).map_err(|err| ManifestError::Parse(err.to_string()))
}

//! Umbrella crate for shipmatch.
//!
//! Stitches the pipeline crates together so callers get the whole matching
//! surface from one dependency: text normalization, vendor alias
//! resolution, catalog indexing, manifest fetching, and the scoring
//! engine.
//!
//! Typical use: load catalog rows, build an engine, point it at a manifest
//! locator.
//!
//! ```no_run
//! use shipmatch::{engine_with_catalog, load_catalog, MatchEngineConfig};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rows = load_catalog(&std::fs::read_to_string("catalog.json")?)?;
//! let engine = engine_with_catalog(&rows, MatchEngineConfig::default())?;
//! let outcome = engine.match_manifest("https://transfers.example/manifest/42")?;
//! println!("{} matched, {} synthesized", outcome.matched, outcome.synthesized);
//! # Ok(())
//! # }
//! ```

pub use catalog::{CatalogEntry, CatalogIndex, CatalogRow, Lineage};
pub use manifest::{
    parse_manifest, validate_locator, FetchConfig, HttpManifestSource, LabResults, ManifestError,
    ManifestItem, ManifestPayload, ManifestSource, PotencyResult,
};
pub use matcher::{
    score, select_candidates, synthesize, KnownProduct, MatchEngine, MatchEngineConfig,
    MatchError, MatchOutcome, MatchedRecord, NoKnowledge, ProductKnowledge, Provenance,
    ScoreView,
};
pub use normalize::{
    extract_key_terms, known_strains_in, normalize, resolve_category, strip_compliance_prefix,
    tokens, ProductCategory, StrainEntry,
};
pub use vendor::{extract_vendor, resolve_vendor_groups, vendors_related};

/// Parse catalog rows from a JSON array. Unknown keys are ignored and
/// known keys accept their common external spellings.
pub fn load_catalog(json: &str) -> Result<Vec<CatalogRow>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Build an engine over `rows` with the HTTP manifest source.
pub fn engine_with_catalog(
    rows: &[CatalogRow],
    cfg: MatchEngineConfig,
) -> Result<MatchEngine, MatchError> {
    let engine = MatchEngine::new(cfg)?;
    engine.rebuild_index(rows);
    Ok(engine)
}

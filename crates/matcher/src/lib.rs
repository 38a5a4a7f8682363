//! Matching engine: reconciles externally fetched inventory manifests
//! against the locally indexed product catalog.
//!
//! The pieces compose in one direction: the selector narrows the catalog
//! to a candidate slate, the scorer ranks the slate, and the engine walks
//! the manifest applying both, synthesizing a fallback record whenever
//! nothing clears the acceptance threshold.

mod engine;
mod fallback;
mod score;
mod select;
pub mod testing;
mod types;

pub use engine::MatchEngine;
pub use fallback::synthesize;
pub use score::{score, ScoreView};
pub use select::select_candidates;
pub use types::{
    KnownProduct, MatchEngineConfig, MatchError, MatchOutcome, MatchedRecord, NoKnowledge,
    ProductKnowledge, Provenance,
};

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use catalog::Lineage;
use manifest::{FetchConfig, ManifestError};

/// Engine-level configuration.
///
/// The numeric knobs are empirically tuned against real transfer data;
/// changing them silently changes acceptance rates, so they default to the
/// established values and are validated rather than clamped.
#[derive(Debug, Clone)]
pub struct MatchEngineConfig {
    /// Minimum score for a candidate to be accepted as a match.
    pub accept_threshold: f64,
    /// Hard cap on the candidate list handed to the scorer, per item.
    pub max_candidates: usize,
    /// When the non-vendor strategies produce fewer candidates than this,
    /// a containment scan over the whole catalog supplements them.
    pub scan_trigger: usize,
    /// Wall-clock budget for one matching run. Checked at item boundaries
    /// only; an item already being scored always runs to completion.
    pub time_budget: Duration,
    /// Manifest fetch behavior.
    pub fetch: FetchConfig,
}

impl Default for MatchEngineConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.1,
            max_candidates: 50,
            scan_trigger: 5,
            time_budget: Duration::from_secs(300),
            fetch: FetchConfig::default(),
        }
    }
}

impl MatchEngineConfig {
    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn with_accept_threshold(mut self, threshold: f64) -> Self {
        self.accept_threshold = threshold;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn validate(&self) -> Result<(), MatchError> {
        if !(0.0..=1.0).contains(&self.accept_threshold) {
            return Err(MatchError::InvalidConfig(
                "accept_threshold must be within [0, 1]".into(),
            ));
        }
        if self.max_candidates == 0 {
            return Err(MatchError::InvalidConfig(
                "max_candidates must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Errors produced by the matching layer.
#[derive(Error, Debug)]
pub enum MatchError {
    /// Invalid input rejected synchronously, before any side effects.
    #[error("invalid input: {0}")]
    Input(String),
    /// Invalid engine configuration.
    #[error("invalid engine config: {0}")]
    InvalidConfig(String),
    /// Manifest fetch or parse failure, after the relay retry.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Where a result record came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Provenance {
    /// A real catalog match: the arena index of the entry and the score it
    /// was accepted at.
    Catalog { index: usize, score: f64 },
    /// Placeholder synthesized because no candidate cleared threshold.
    Synthesized,
}

/// One normalized result record, either a catalog match or a fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRecord {
    pub name: String,
    pub vendor: Option<String>,
    pub brand: Option<String>,
    pub lineage: Lineage,
    pub product_type: Option<String>,
    /// Raw numeric weight from the manifest item.
    pub weight: Option<f64>,
    /// Weight rendered with its unit appended, when known.
    pub display_weight: Option<String>,
    pub price: Option<f64>,
    pub strain: Option<String>,
    /// Cannabinoid totals keyed by uppercased analyte tag.
    pub cannabinoids: BTreeMap<String, f64>,
    pub coa_link: Option<String>,
    pub provenance: Provenance,
}

impl MatchedRecord {
    pub fn is_synthesized(&self) -> bool {
        matches!(self.provenance, Provenance::Synthesized)
    }
}

/// Aggregated result of one matching run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchOutcome {
    /// Result records in manifest item order.
    pub records: Vec<MatchedRecord>,
    /// Display names of the catalog entries that were matched.
    pub matched_names: Vec<String>,
    /// Items that had a usable name and were run through the pipeline.
    pub processed: usize,
    pub matched: usize,
    pub synthesized: usize,
    /// True when the time budget cut the run short; `records` covers only
    /// the items consumed before cutoff.
    pub truncated: bool,
    pub completed_at: DateTime<Utc>,
}

impl MatchOutcome {
    pub(crate) fn empty() -> Self {
        Self {
            records: Vec::new(),
            matched_names: Vec::new(),
            processed: 0,
            matched: 0,
            synthesized: 0,
            truncated: false,
            completed_at: Utc::now(),
        }
    }
}

/// Stored facts about a product, from the external product-knowledge
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnownProduct {
    pub lineage: Option<String>,
    pub price: Option<f64>,
    pub vendor: Option<String>,
    pub brand: Option<String>,
}

/// Exact-name lookup into the external product-knowledge store.
pub trait ProductKnowledge: Send + Sync {
    fn lookup(&self, name: &str) -> Option<KnownProduct>;
}

/// Knowledge source that knows nothing; the default collaborator.
pub struct NoKnowledge;

impl ProductKnowledge for NoKnowledge {
    fn lookup(&self, _name: &str) -> Option<KnownProduct> {
        None
    }
}

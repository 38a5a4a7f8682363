//! The matching orchestrator.
//!
//! One `MatchEngine` owns the catalog index snapshot, the manifest source,
//! and the product-knowledge collaborator. A matching run walks
//! `Fetching -> Indexing -> Scoring -> Done | TimedOut`; items are consumed
//! strictly in manifest order so results are reproducible.

use std::sync::{Arc, RwLock};
use std::time::Instant;

use tracing::{debug, info, warn};

use catalog::{CatalogEntry, CatalogIndex, CatalogRow, Lineage};
use manifest::{validate_locator, HttpManifestSource, ManifestItem, ManifestSource};

use crate::fallback::synthesize;
use crate::score::{score, ScoreView};
use crate::select::select_candidates;
use crate::types::{
    MatchEngineConfig, MatchError, MatchOutcome, MatchedRecord, NoKnowledge, ProductKnowledge,
    Provenance,
};

pub struct MatchEngine {
    source: Box<dyn ManifestSource>,
    knowledge: Box<dyn ProductKnowledge>,
    cfg: MatchEngineConfig,
    /// Current catalog snapshot. Swapped whole on rebuild: readers hold an
    /// `Arc` to either the old complete index or the new one, never a mix.
    index: RwLock<Option<Arc<CatalogIndex>>>,
    last: RwLock<Option<MatchOutcome>>,
}

impl MatchEngine {
    /// Engine with the HTTP manifest source and no external knowledge.
    pub fn new(cfg: MatchEngineConfig) -> Result<Self, MatchError> {
        let source = HttpManifestSource::new(cfg.fetch.clone())?;
        Self::with_parts(cfg, Box::new(source), Box::new(NoKnowledge))
    }

    /// Engine with explicit collaborators; the seam tests plug into.
    pub fn with_parts(
        cfg: MatchEngineConfig,
        source: Box<dyn ManifestSource>,
        knowledge: Box<dyn ProductKnowledge>,
    ) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self {
            source,
            knowledge,
            cfg,
            index: RwLock::new(None),
            last: RwLock::new(None),
        })
    }

    /// Discard any existing index and build a fresh one from `rows`.
    pub fn rebuild_index(&self, rows: &[CatalogRow]) {
        let built = Arc::new(CatalogIndex::build(rows));
        info!(status = %built.status(), "catalog index rebuilt");
        let mut slot = self.index.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(built);
    }

    fn snapshot(&self) -> Option<Arc<CatalogIndex>> {
        self.index
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Human-readable state of the catalog index.
    pub fn cache_status(&self) -> String {
        match self.snapshot() {
            Some(index) => index.status(),
            None => "not built".to_string(),
        }
    }

    /// The most recent outcome, kept for introspection only.
    pub fn last_outcome(&self) -> Option<MatchOutcome> {
        self.last
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Fetch the manifest at `locator` and match every item against the
    /// catalog. Fetch failures (after the relay retry) fail the whole run;
    /// running out of time budget does not, it truncates instead.
    pub fn match_manifest(&self, locator: &str) -> Result<MatchOutcome, MatchError> {
        validate_locator(locator).map_err(|e| MatchError::Input(e.to_string()))?;

        let Some(index) = self.snapshot() else {
            warn!("match attempted with no catalog loaded");
            return Ok(self.finish(MatchOutcome::empty()));
        };
        if index.is_empty() {
            debug!("catalog index is empty, skipping fetch");
            return Ok(self.finish(MatchOutcome::empty()));
        }

        let payload = self.source.fetch(locator)?;
        let items = payload.items.unwrap_or_default();
        debug!(manifest = ?payload.id, items = items.len(), "manifest fetched");

        // The fetch has its own timeout; the budget covers scoring only.
        let started = Instant::now();
        let mut outcome = MatchOutcome::empty();

        for item in &items {
            // Budget is checked only here, between items. An item that has
            // begun scoring always runs to completion.
            if started.elapsed() >= self.cfg.time_budget {
                warn!(processed = outcome.processed, "time budget exceeded, truncating run");
                outcome.truncated = true;
                break;
            }
            let Some(name) = item.usable_name() else {
                continue;
            };
            outcome.processed += 1;
            self.match_item(&index, item, name, &mut outcome);
        }

        outcome.completed_at = chrono::Utc::now();
        info!(
            processed = outcome.processed,
            matched = outcome.matched,
            synthesized = outcome.synthesized,
            truncated = outcome.truncated,
            "matching run finished"
        );
        Ok(self.finish(outcome))
    }

    fn match_item(
        &self,
        index: &CatalogIndex,
        item: &ManifestItem,
        name: &str,
        outcome: &mut MatchOutcome,
    ) {
        let slate = select_candidates(
            index,
            item,
            name,
            self.cfg.max_candidates,
            self.cfg.scan_trigger,
        );
        let item_view = ScoreView::of_item(item, name);

        let mut best: Option<(f64, &CatalogEntry)> = None;
        for pos in slate {
            let Some(entry) = index.get(pos) else {
                continue;
            };
            let s = score(&item_view, &ScoreView::of_entry(entry));
            // Ties go to the lowest catalog index.
            let better = match best {
                None => s > 0.0,
                Some((bs, be)) => s > bs || (s == bs && entry.index < be.index),
            };
            if better {
                best = Some((s, entry));
            }
        }

        match best {
            Some((s, entry)) if s >= self.cfg.accept_threshold => {
                debug!(item = name, matched = %entry.display_name, score = s, "accepted");
                outcome.matched += 1;
                outcome.matched_names.push(entry.display_name.clone());
                outcome.records.push(record_from_entry(entry, item, s));
            }
            _ => {
                debug!(item = name, "no candidate cleared threshold, synthesizing");
                outcome.synthesized += 1;
                outcome
                    .records
                    .push(synthesize(name, item, self.knowledge.as_ref()));
            }
        }
    }

    fn finish(&self, outcome: MatchOutcome) -> MatchOutcome {
        let mut slot = self.last.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(outcome.clone());
        outcome
    }
}

/// A result record backed by a real catalog entry. Identity fields come
/// from the catalog; shipment-specific fields (weight, price, potency)
/// come from the manifest item.
fn record_from_entry(entry: &CatalogEntry, item: &ManifestItem, score: f64) -> MatchedRecord {
    MatchedRecord {
        name: entry.display_name.clone(),
        vendor: entry.vendor.clone().or_else(|| item.vendor.clone()),
        brand: entry.brand.clone().or_else(|| item.brand.clone()),
        lineage: Lineage::sanitize(entry.lineage.as_deref().or(item.lineage.as_deref())),
        product_type: entry
            .product_type
            .clone()
            .or_else(|| item.product_type.clone()),
        weight: item.weight,
        display_weight: item.display_weight(),
        price: item.price,
        strain: entry.strain.clone().or_else(|| item.strain.clone()),
        cannabinoids: item.cannabinoids(),
        coa_link: item.lab_result.as_ref().and_then(|l| l.coa_link.clone()),
        provenance: Provenance::Catalog {
            index: entry.index,
            score,
        },
    }
}

#[cfg(test)]
mod tests;

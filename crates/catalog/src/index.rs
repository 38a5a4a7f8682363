use std::collections::BTreeMap;

use tracing::debug;

use normalize::{extract_key_terms, normalize, tokens};

use crate::entry::{CatalogEntry, CatalogRow};

/// Marker that disqualifies rows whose only name source is the generic
/// description field.
const SAMPLE_MARKER: &str = "sample";

/// Four associative lookups over an arena of catalog entries, built
/// together in one pass.
///
/// The maps hold arena positions, not entry copies; `BTreeMap` keeps
/// iteration deterministic. A built index is immutable — rebuilds produce
/// a fresh value that owners swap in whole, so readers only ever observe
/// a complete index.
#[derive(Debug, Default)]
pub struct CatalogIndex {
    entries: Vec<CatalogEntry>,
    by_exact: BTreeMap<String, usize>,
    by_vendor: BTreeMap<String, Vec<usize>>,
    by_term: BTreeMap<String, Vec<usize>>,
    by_normalized: BTreeMap<String, Vec<usize>>,
}

impl CatalogIndex {
    /// Build the index from a catalog snapshot. Single pass, O(rows),
    /// insertion order follows the input row order.
    pub fn build(rows: &[CatalogRow]) -> Self {
        let mut index = CatalogIndex::default();
        let mut dropped = 0usize;

        for row in rows {
            let Some((display, from_description)) = row.display_name() else {
                dropped += 1;
                continue;
            };
            if from_description && display.to_lowercase().contains(SAMPLE_MARKER) {
                dropped += 1;
                continue;
            }

            let position = index.entries.len();
            let normalized = normalize(display);
            let vendor_key = row
                .vendor
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
                .or_else(|| vendor::extract_vendor(display));

            let entry = CatalogEntry {
                index: position,
                display_name: display.to_string(),
                normalized_name: normalized.clone(),
                tokens: tokens(display),
                key_terms: extract_key_terms(display),
                vendor: vendor_key.clone(),
                brand: row.brand.clone(),
                product_type: row.product_type.clone(),
                lineage: row.lineage.clone(),
                strain: row.strain.clone(),
            };

            index.by_exact.entry(normalized.clone()).or_insert(position);
            index
                .by_normalized
                .entry(normalized)
                .or_default()
                .push(position);
            if let Some(vendor_key) = vendor_key {
                index.by_vendor.entry(vendor_key).or_default().push(position);
            }
            for term in &entry.key_terms {
                index.by_term.entry(term.clone()).or_default().push(position);
            }
            index.entries.push(entry);
        }

        debug!(
            entries = index.entries.len(),
            dropped,
            vendors = index.by_vendor.len(),
            terms = index.by_term.len(),
            "catalog index built"
        );
        index
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, position: usize) -> Option<&CatalogEntry> {
        self.entries.get(position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Single entry whose normalized name equals `normalized` exactly
    /// (first by insertion order when several rows share the form).
    pub fn exact(&self, normalized: &str) -> Option<&CatalogEntry> {
        self.by_exact.get(normalized).map(|&pos| &self.entries[pos])
    }

    /// Entries under an exact (lowercased) vendor key.
    pub fn vendor_group(&self, vendor_key: &str) -> &[usize] {
        self.by_vendor
            .get(vendor_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All known vendor keys, in deterministic order.
    pub fn vendor_keys(&self) -> impl Iterator<Item = &str> {
        self.by_vendor.keys().map(String::as_str)
    }

    /// Inverted-index bucket for one key term.
    pub fn term_bucket(&self, term: &str) -> &[usize] {
        self.by_term.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All entries sharing one normalized name form.
    pub fn normalized_bucket(&self, normalized: &str) -> &[usize] {
        self.by_normalized
            .get(normalized)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Human-readable cache summary.
    pub fn status(&self) -> String {
        if self.entries.is_empty() {
            return "empty".to_string();
        }
        format!(
            "built with {} entries, indexed: {} exact / {} vendors / {} terms",
            self.entries.len(),
            self.by_exact.len(),
            self.by_vendor.len(),
            self.by_term.len(),
        )
    }
}

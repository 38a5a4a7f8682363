//! Pairwise confidence scoring between a manifest item and a catalog
//! candidate.
//!
//! Rules run as an ordered table; the first applicable rule decides the
//! score. The numeric constants are empirically tuned and load-bearing:
//! nudging any of them shifts acceptance rates across whole manifests.

use std::collections::BTreeSet;

use catalog::CatalogEntry;
use manifest::ManifestItem;
use normalize::{
    extract_key_terms, known_strains_in, normalize, resolve_category, tokens, ProductCategory,
    StrainEntry,
};
use vendor::vendors_related;

const VENDOR_BONUS: f64 = 0.4;
const CATEGORY_BONUS: f64 = 0.2;
const STRAIN_BONUS: f64 = 0.3;
const TERM_OVERLAP_MIN: f64 = 0.3;
const SCORE_FLOOR: f64 = 0.1;
const ABSOLUTE_FLOOR: f64 = 0.05;

/// One side of a comparison, pre-digested so scoring never re-tokenizes.
#[derive(Debug, Clone)]
pub struct ScoreView {
    normalized: String,
    tokens: BTreeSet<String>,
    key_terms: BTreeSet<String>,
    category: Option<ProductCategory>,
    vendor: Option<String>,
    strains: Vec<StrainEntry>,
}

impl ScoreView {
    pub fn of_item(item: &ManifestItem, name: &str) -> Self {
        // Only a declared vendor field participates in the vendor guard.
        // First-word extraction is too eager for scoring: it would turn
        // every pair of unlike names into a vendor mismatch.
        let vendor = item
            .vendor
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_lowercase);
        Self {
            normalized: normalize(name),
            tokens: tokens(name),
            key_terms: extract_key_terms(name),
            category: resolve_category(item.product_type.as_deref(), name),
            vendor,
            strains: strains_of(name, item.strain.as_deref()),
        }
    }

    pub fn of_entry(entry: &CatalogEntry) -> Self {
        Self {
            normalized: entry.normalized_name.clone(),
            tokens: entry.tokens.clone(),
            key_terms: entry.key_terms.clone(),
            category: resolve_category(entry.product_type.as_deref(), &entry.display_name),
            vendor: entry.vendor.clone(),
            strains: strains_of(&entry.display_name, entry.strain.as_deref()),
        }
    }

    fn strain_names(&self) -> BTreeSet<&'static str> {
        self.strains.iter().map(|s| s.name).collect()
    }

    fn lineages(&self) -> BTreeSet<&'static str> {
        self.strains.iter().map(|s| s.lineage).collect()
    }
}

fn strains_of(name: &str, strain_field: Option<&str>) -> Vec<StrainEntry> {
    let mut haystack = name.to_string();
    if let Some(strain) = strain_field {
        haystack.push(' ');
        haystack.push_str(strain);
    }
    known_strains_in(&haystack)
}

/// Confidence in [0, 1] that `a` and `b` describe the same product.
/// Symmetric: swapping the sides yields the same score.
pub fn score(a: &ScoreView, b: &ScoreView) -> f64 {
    // Rule 1: both sides must resolve to a recognized category.
    if a.category.is_none() || b.category.is_none() {
        return 0.0;
    }

    // Rule 2: identical after normalization.
    if !a.normalized.is_empty() && a.normalized == b.normalized {
        return 1.0;
    }

    // Rule 3: one normalized name contains the other.
    if !a.normalized.is_empty()
        && !b.normalized.is_empty()
        && (a.normalized.contains(&b.normalized) || b.normalized.contains(&a.normalized))
    {
        return 0.9;
    }

    // Rule 4: strict vendor guard. Unrelated explicit vendors reject the
    // pair outright; an exact match banks a bonus for the rules below.
    let mut bonus = 0.0;
    if let (Some(va), Some(vb)) = (a.vendor.as_deref(), b.vendor.as_deref()) {
        if va == vb {
            bonus = VENDOR_BONUS;
        } else if !vendors_related(va, vb) {
            return 0.0;
        }
    }

    // Rule 5: key-term overlap (Jaccard and overlap-ratio averaged).
    let inter = a.key_terms.intersection(&b.key_terms).count() as f64;
    if inter > 0.0 {
        let union = a.key_terms.union(&b.key_terms).count() as f64;
        let smaller = a.key_terms.len().min(b.key_terms.len()) as f64;
        let avg = (inter / union + inter / smaller) / 2.0;
        if avg >= TERM_OVERLAP_MIN {
            let mut total = avg.min(0.9) + bonus;
            if a.category == b.category {
                total += CATEGORY_BONUS;
            }
            let (sa, sb) = (a.strain_names(), b.strain_names());
            if !sa.is_empty() && sa == sb {
                total += STRAIN_BONUS;
            }
            return total.max(SCORE_FLOOR).clamp(0.0, 1.0);
        }
    }

    // Rule 6: raw token overlap.
    let shared = a.tokens.intersection(&b.tokens).count();
    if shared >= 1 {
        let base = (0.4 + 0.1 * shared as f64).min(0.95);
        return (base + bonus).max(SCORE_FLOOR).clamp(0.0, 1.0);
    }

    // Rule 7: known strains on both sides with overlapping lineage.
    if !a.strains.is_empty()
        && !b.strains.is_empty()
        && !a.lineages().is_disjoint(&b.lineages())
    {
        return (0.75 + bonus).clamp(0.0, 1.0);
    }

    // Rule 8: whole-string similarity, only for comparably sized names.
    if a.normalized.len().abs_diff(b.normalized.len()) <= 10 {
        let ratio = strsim::normalized_levenshtein(&a.normalized, &b.normalized);
        return (ratio * 0.5 + bonus).clamp(0.0, 1.0);
    }

    // Rule 9: never a hard zero once the guards are satisfied.
    (ABSOLUTE_FLOOR).max(bonus).clamp(0.0, 1.0)
}

//! Candidate selection: narrows the catalog to a small slate of entries
//! worth scoring against one manifest item.
//!
//! Strategies run as a cascade. An exact normalized-name hit is final. A
//! vendor-group hit is authoritative even when small: items from a known
//! vendor must not pick up lookalike products from other vendors, so later
//! strategies never widen a vendor slate. Only when no vendor group
//! resolves do the term-based strategies run.

use std::collections::BTreeSet;

use catalog::CatalogIndex;
use manifest::ManifestItem;
use normalize::{extract_key_terms, known_strains_in, normalize, resolve_category};
use vendor::{extract_vendor, resolve_vendor_groups};

/// Pick up to `cap` candidate entry indices for `item`.
///
/// `name` must be the item's usable name; callers skip items without one.
pub fn select_candidates(
    index: &CatalogIndex,
    item: &ManifestItem,
    name: &str,
    cap: usize,
    scan_trigger: usize,
) -> Vec<usize> {
    let normalized = normalize(name);

    if let Some(entry) = index.exact(&normalized) {
        return vec![entry.index];
    }

    let slate = vendor_slate(index, item, name);
    if !slate.is_empty() {
        let mut ranked = rank_by_affinity(index, item, name, slate);
        ranked.truncate(cap);
        return ranked;
    }

    let mut slate = term_slate(index, name);
    if slate.is_empty() {
        slate.extend_from_slice(index.normalized_bucket(&normalized));
    }
    if slate.len() < scan_trigger {
        containment_scan(index, &normalized, &mut slate);
    }
    slate.truncate(cap);
    slate
}

/// Everything indexed under the item's vendor, resolved through the alias
/// table when the literal key is unknown.
fn vendor_slate(index: &CatalogIndex, item: &ManifestItem, name: &str) -> Vec<usize> {
    let query = item
        .vendor
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
        .or_else(|| extract_vendor(name));
    let Some(query) = query else {
        return Vec::new();
    };

    let direct = index.vendor_group(&query);
    if !direct.is_empty() {
        return direct.to_vec();
    }

    let mut slate = Vec::new();
    let mut seen = BTreeSet::new();
    for key in resolve_vendor_groups(&query, index.vendor_keys()) {
        for &pos in index.vendor_group(&key) {
            if seen.insert(pos) {
                slate.push(pos);
            }
        }
    }
    slate
}

/// Union of the key-term buckets for the item name, first occurrence wins.
fn term_slate(index: &CatalogIndex, name: &str) -> Vec<usize> {
    let mut slate = Vec::new();
    let mut seen = BTreeSet::new();
    for term in extract_key_terms(name) {
        for &pos in index.term_bucket(&term) {
            if seen.insert(pos) {
                slate.push(pos);
            }
        }
    }
    slate
}

/// Last resort for sparse slates: substring containment over normalized
/// names, either direction. Linear in catalog size, so it only runs when
/// the indexed strategies came up nearly empty.
fn containment_scan(index: &CatalogIndex, normalized: &str, slate: &mut Vec<usize>) {
    if normalized.is_empty() {
        return;
    }
    let seen: BTreeSet<usize> = slate.iter().copied().collect();
    for entry in index.entries() {
        if seen.contains(&entry.index) {
            continue;
        }
        if entry.normalized_name.contains(normalized) || normalized.contains(&entry.normalized_name)
        {
            slate.push(entry.index);
        }
    }
}

/// Order a vendor slate so entries agreeing with the item on category and
/// strain come first. Stable, so catalog order breaks ties.
fn rank_by_affinity(
    index: &CatalogIndex,
    item: &ManifestItem,
    name: &str,
    mut slate: Vec<usize>,
) -> Vec<usize> {
    let item_category = resolve_category(item.product_type.as_deref(), name);
    let item_strains: BTreeSet<&str> = strain_names(name, item.strain.as_deref());

    slate.sort_by_key(|&pos| {
        let Some(entry) = index.get(pos) else {
            return 2u8;
        };
        let category_hit = match (
            item_category,
            resolve_category(entry.product_type.as_deref(), &entry.display_name),
        ) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        let entry_strains = strain_names(&entry.display_name, entry.strain.as_deref());
        let strain_hit =
            !item_strains.is_empty() && !item_strains.is_disjoint(&entry_strains);
        match (category_hit, strain_hit) {
            (true, true) => 0,
            (true, false) | (false, true) => 1,
            (false, false) => 2,
        }
    });
    slate
}

fn strain_names(name: &str, strain_field: Option<&str>) -> BTreeSet<&'static str> {
    let mut haystack = name.to_string();
    if let Some(strain) = strain_field {
        haystack.push(' ');
        haystack.push_str(strain);
    }
    known_strains_in(&haystack)
        .into_iter()
        .map(|entry| entry.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::CatalogRow;

    fn row(name: &str, vendor: Option<&str>, product_type: Option<&str>) -> CatalogRow {
        CatalogRow {
            product_name: Some(name.to_string()),
            vendor: vendor.map(str::to_string),
            product_type: product_type.map(str::to_string),
            ..Default::default()
        }
    }

    fn item(name: &str, vendor: Option<&str>) -> (ManifestItem, String) {
        let item = ManifestItem {
            name: Some(name.to_string()),
            vendor: vendor.map(str::to_string),
            ..Default::default()
        };
        (item, name.to_string())
    }

    #[test]
    fn exact_hit_returns_single_candidate() {
        let index = CatalogIndex::build(&[
            row("Blue Dream Flower", Some("phat panda"), Some("flower")),
            row("Blue Dream Cartridge", Some("phat panda"), Some("cartridge")),
        ]);
        let (it, name) = item("Blue Dream Flower", None);
        let slate = select_candidates(&index, &it, &name, 50, 5);
        assert_eq!(slate.len(), 1);
        assert_eq!(
            index.get(slate[0]).map(|e| e.display_name.as_str()),
            Some("Blue Dream Flower")
        );
    }

    #[test]
    fn vendor_group_is_authoritative() {
        let index = CatalogIndex::build(&[
            row("GMO Rosin", Some("dank czar"), Some("concentrate")),
            row("GMO Flower", Some("phat panda"), Some("flower")),
        ]);
        // Alias resolution maps "dank" to the "dank czar" group; the
        // phat panda GMO entry must not leak into the slate.
        let (it, name) = item("Dank Czar GMO Rosin 1g", Some("dank"));
        let slate = select_candidates(&index, &it, &name, 50, 0);
        assert_eq!(slate.len(), 1);
        assert_eq!(
            index.get(slate[0]).map(|e| e.display_name.as_str()),
            Some("GMO Rosin")
        );
    }

    #[test]
    fn vendor_ranking_prefers_category_and_strain_agreement() {
        let index = CatalogIndex::build(&[
            row("Dosido Flower", Some("dank czar"), Some("flower")),
            row("Grape Gas Rosin", Some("dank czar"), Some("concentrate")),
            row("Grape Gas Flower", Some("dank czar"), Some("flower")),
        ]);
        let (it, name) = item("Grape Gas Live Rosin 1g", Some("dank czar"));
        let slate = select_candidates(&index, &it, &name, 50, 0);
        assert_eq!(
            index.get(slate[0]).map(|e| e.display_name.as_str()),
            Some("Grape Gas Rosin")
        );
    }

    #[test]
    fn unknown_vendor_falls_back_to_key_terms() {
        let index = CatalogIndex::build(&[
            row("Grape Gas Rosin", Some("jsm llc"), Some("concentrate")),
            row("Lemon Haze Cart", Some("jsm llc"), Some("cartridge")),
        ]);
        let (it, name) = item("Grape Gas Rosin 1g", Some("omega"));
        let slate = select_candidates(&index, &it, &name, 50, 0);
        assert!(!slate.is_empty());
        assert_eq!(
            index.get(slate[0]).map(|e| e.display_name.as_str()),
            Some("Grape Gas Rosin")
        );
    }

    #[test]
    fn extracted_vendor_reaches_the_vendor_tier() {
        // The catalog row has no vendor field, so the index extracted
        // "zkittlez" from the name; the item's first word resolves to it.
        let index = CatalogIndex::build(&[row("Zkittlez Premium Shake", None, Some("flower"))]);
        let (it, name) = item("Zkittlez", None);
        let slate = select_candidates(&index, &it, &name, 50, 0);
        assert_eq!(slate.len(), 1);
    }

    #[test]
    fn sparse_slate_triggers_containment_scan() {
        // "kittle" shares no token or key term with the entry, but it is a
        // substring of the normalized name; only the scan can find it.
        let index = CatalogIndex::build(&[row("Zkittlez Premium Shake", None, Some("flower"))]);
        let (it, name) = item("Kittle", Some("nobody known"));
        let slate = select_candidates(&index, &it, &name, 50, 5);
        assert_eq!(slate.len(), 1);

        // With the scan disabled (trigger 0) nothing is found.
        let slate = select_candidates(&index, &it, &name, 50, 0);
        assert!(slate.is_empty());
    }

    #[test]
    fn cap_truncates_slate() {
        let rows: Vec<CatalogRow> = (0..60)
            .map(|i| row(&format!("Blue Dream Jar {i}"), Some("phat panda"), Some("flower")))
            .collect();
        let index = CatalogIndex::build(&rows);
        let (it, name) = item("Blue Dream Jar", Some("phat panda"));
        let slate = select_candidates(&index, &it, &name, 50, 5);
        assert_eq!(slate.len(), 50);
    }
}

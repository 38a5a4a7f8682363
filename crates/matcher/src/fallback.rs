//! Placeholder records for manifest items nothing in the catalog matched.
//!
//! A fallback is always produced rather than dropping the item, so the
//! result list stays aligned with the manifest. Field values cascade from
//! the item itself, to the strain lexicon, to the external knowledge
//! store, to fixed heuristics.

use catalog::Lineage;
use manifest::ManifestItem;
use normalize::{known_strains_in, resolve_category, ProductCategory};

use crate::types::{MatchedRecord, ProductKnowledge, Provenance};

/// Build a synthesized record for an unmatched item.
///
/// Fields cascade, first non-empty source wins. Lineage: strain lexicon,
/// then the item's own declared lineage, then the knowledge store, then
/// `"HYBRID"`. Price, vendor, and brand: the item itself, then the
/// knowledge store; price last falls through to a category-tier guess.
pub fn synthesize(
    name: &str,
    item: &ManifestItem,
    knowledge: &dyn ProductKnowledge,
) -> MatchedRecord {
    let known = knowledge.lookup(name);

    let lineage = lexicon_lineage(name, item.strain.as_deref())
        .map(str::to_string)
        .or_else(|| item.lineage.clone())
        .or_else(|| known.as_ref().and_then(|k| k.lineage.clone()))
        .unwrap_or_else(|| "HYBRID".to_string());

    let price = item
        .price
        .or_else(|| known.as_ref().and_then(|k| k.price))
        .or_else(|| Some(heuristic_price(item, name)));

    let vendor = item
        .vendor
        .clone()
        .or_else(|| known.as_ref().and_then(|k| k.vendor.clone()));
    let brand = item
        .brand
        .clone()
        .or_else(|| known.as_ref().and_then(|k| k.brand.clone()));

    MatchedRecord {
        name: name.to_string(),
        vendor,
        brand,
        lineage: Lineage::sanitize(Some(&lineage)),
        product_type: item.product_type.clone(),
        weight: item.weight,
        display_weight: item.display_weight(),
        price,
        strain: item.strain.clone(),
        cannabinoids: item.cannabinoids(),
        coa_link: item.lab_result.as_ref().and_then(|l| l.coa_link.clone()),
        provenance: Provenance::Synthesized,
    }
}

/// Lineage of the first known strain found in the item's text.
fn lexicon_lineage(name: &str, strain_field: Option<&str>) -> Option<&'static str> {
    let mut haystack = name.to_string();
    if let Some(strain) = strain_field {
        haystack.push(' ');
        haystack.push_str(strain);
    }
    known_strains_in(&haystack)
        .into_iter()
        .next()
        .map(|entry| entry.lineage)
}

/// Tiered price guess keyed off the resolved product category.
fn heuristic_price(item: &ManifestItem, name: &str) -> f64 {
    match resolve_category(item.product_type.as_deref(), name) {
        Some(ProductCategory::PreRoll) => 6.0,
        Some(ProductCategory::Flower) => 10.0,
        Some(ProductCategory::Concentrate) | Some(ProductCategory::Cartridge) => 25.0,
        _ => 12.0,
    }
}

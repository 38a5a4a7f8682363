//! Fixed domain vocabularies: stop/packaging terms, product-type keywords,
//! and the strain lexicon with genetic lineages.
//!
//! These tables are the matching engine's only built-in domain knowledge.
//! They are static by design; anything tenant-specific belongs in the
//! catalog itself or the external product-knowledge collaborator.

use once_cell::sync::Lazy;
use std::collections::{BTreeMap, BTreeSet};

use crate::text::normalize;

/// Leading compliance notice stamped on regulated transfer manifests.
pub const COMPLIANCE_PREFIX: &str = "medically compliant";

/// Packaging and filler terms that carry no matching signal.
pub(crate) static STOP_TERMS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "the", "and", "with", "for", "from", "each", "per", "pack", "packs", "pkg", "gram",
        "grams", "unit", "units", "case", "cases", "piece", "pieces", "count", "bulk",
        "assorted", "misc", "sample", "medically", "compliant",
    ]
    .into_iter()
    .collect()
});

/// Recognized cannabis product categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProductCategory {
    Flower,
    PreRoll,
    Concentrate,
    Cartridge,
    Edible,
    Beverage,
    Topical,
    Tincture,
    Capsule,
    Cbd,
    Paraphernalia,
}

/// Keyword → category table used to resolve a product type from free text.
static PRODUCT_TYPES: Lazy<BTreeMap<&'static str, ProductCategory>> = Lazy::new(|| {
    use ProductCategory::*;
    [
        ("flower", Flower),
        ("bud", Flower),
        ("buds", Flower),
        ("eighth", Flower),
        ("eighths", Flower),
        ("smalls", Flower),
        ("popcorn", Flower),
        ("preroll", PreRoll),
        ("prerolls", PreRoll),
        ("joint", PreRoll),
        ("joints", PreRoll),
        ("blunt", PreRoll),
        ("blunts", PreRoll),
        ("doobie", PreRoll),
        ("infused", PreRoll),
        ("rosin", Concentrate),
        ("resin", Concentrate),
        ("hash", Concentrate),
        ("wax", Concentrate),
        ("shatter", Concentrate),
        ("dab", Concentrate),
        ("dabs", Concentrate),
        ("concentrate", Concentrate),
        ("extract", Concentrate),
        ("distillate", Concentrate),
        ("sauce", Concentrate),
        ("badder", Concentrate),
        ("batter", Concentrate),
        ("sugar", Concentrate),
        ("crumble", Concentrate),
        ("diamonds", Concentrate),
        ("kief", Concentrate),
        ("rso", Concentrate),
        ("cart", Cartridge),
        ("carts", Cartridge),
        ("cartridge", Cartridge),
        ("cartridges", Cartridge),
        ("vape", Cartridge),
        ("pod", Cartridge),
        ("pods", Cartridge),
        ("disposable", Cartridge),
        ("gummy", Edible),
        ("gummies", Edible),
        ("edible", Edible),
        ("edibles", Edible),
        ("chocolate", Edible),
        ("cookie", Edible),
        ("cookies", Edible),
        ("brownie", Edible),
        ("mints", Edible),
        ("chews", Edible),
        ("beverage", Beverage),
        ("drink", Beverage),
        ("soda", Beverage),
        ("seltzer", Beverage),
        ("topical", Topical),
        ("balm", Topical),
        ("lotion", Topical),
        ("salve", Topical),
        ("tincture", Tincture),
        ("drops", Tincture),
        ("capsule", Capsule),
        ("capsules", Capsule),
        ("softgel", Capsule),
        ("cbd", Cbd),
        ("cbn", Cbd),
        ("cbg", Cbd),
        ("pipe", Paraphernalia),
        ("bong", Paraphernalia),
        ("grinder", Paraphernalia),
        ("papers", Paraphernalia),
        ("battery", Paraphernalia),
        ("lighter", Paraphernalia),
        ("banger", Paraphernalia),
        ("rig", Paraphernalia),
    ]
    .into_iter()
    .collect()
});

/// A known strain and its genetic lineage tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrainEntry {
    pub name: &'static str,
    pub lineage: &'static str,
}

/// Fixed strain lexicon. Names are stored normalized (lowercase, no
/// punctuation) so lookups run against `normalize` output.
static STRAIN_LEXICON: Lazy<Vec<StrainEntry>> = Lazy::new(|| {
    const fn s(name: &'static str, lineage: &'static str) -> StrainEntry {
        StrainEntry { name, lineage }
    }
    vec![
        s("blue dream", "HYBRID/SATIVA"),
        s("sour diesel", "SATIVA"),
        s("green crack", "SATIVA"),
        s("durban poison", "SATIVA"),
        s("jack herer", "SATIVA"),
        s("super lemon haze", "SATIVA"),
        s("strawberry cough", "SATIVA"),
        s("granddaddy purple", "INDICA"),
        s("northern lights", "INDICA"),
        s("bubba kush", "INDICA"),
        s("grape ape", "INDICA"),
        s("purple punch", "INDICA"),
        s("zkittlez", "INDICA"),
        s("do si dos", "INDICA"),
        s("gmo cookies", "INDICA"),
        s("grape gas", "INDICA"),
        s("blueberry", "INDICA"),
        s("gelato", "HYBRID"),
        s("runtz", "HYBRID"),
        s("gorilla glue", "HYBRID"),
        s("gg4", "HYBRID"),
        s("white widow", "HYBRID"),
        s("chemdawg", "HYBRID"),
        s("mac 1", "HYBRID"),
        s("apple fritter", "HYBRID"),
        s("cereal milk", "HYBRID"),
        s("dutch treat", "HYBRID"),
        s("girl scout cookies", "HYBRID"),
        s("gsc", "HYBRID"),
        s("pineapple express", "HYBRID/SATIVA"),
        s("mimosa", "HYBRID/SATIVA"),
        s("trainwreck", "HYBRID/SATIVA"),
        s("og kush", "HYBRID/INDICA"),
        s("wedding cake", "HYBRID/INDICA"),
        s("lava cake", "HYBRID/INDICA"),
        s("khalifa kush", "HYBRID/INDICA"),
        s("acdc", "CBD"),
        s("harlequin", "CBD"),
        s("charlottes web", "CBD"),
    ]
});

/// Every strain name found in `text` (normalized substring search).
pub fn known_strains_in(text: &str) -> Vec<StrainEntry> {
    let haystack = format!(" {} ", normalize(text));
    STRAIN_LEXICON
        .iter()
        .filter(|entry| haystack.contains(&format!(" {} ", entry.name)))
        .copied()
        .collect()
}

/// Resolve a product category from an explicit type field when present,
/// falling back to a keyword scan of the descriptive name.
pub fn resolve_category(explicit: Option<&str>, name: &str) -> Option<ProductCategory> {
    if let Some(field) = explicit {
        if let Some(cat) = category_of(field) {
            return Some(cat);
        }
    }
    category_of(name)
}

/// First category keyword hit in the normalized text, scanning tokens in order.
fn category_of(text: &str) -> Option<ProductCategory> {
    // "pre roll" splits into tokens the table can't see; check the joined
    // bigram as well as single tokens.
    let normalized = normalize(text);
    let toks: Vec<&str> = normalized.split_whitespace().collect();
    for window in toks.windows(2) {
        let joined = format!("{}{}", window[0], window[1]);
        if let Some(cat) = PRODUCT_TYPES.get(joined.as_str()) {
            return Some(*cat);
        }
    }
    toks.iter().find_map(|t| PRODUCT_TYPES.get(t).copied())
}

/// True when the token (any length) is meaningful vocabulary: a product-type
/// keyword or a word of a known strain name.
pub(crate) fn is_vocabulary_token(token: &str) -> bool {
    if PRODUCT_TYPES.contains_key(token) {
        return true;
    }
    STRAIN_LEXICON
        .iter()
        .any(|entry| entry.name.split_whitespace().any(|word| word == token))
}

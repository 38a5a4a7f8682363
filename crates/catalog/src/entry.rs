use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A raw catalog row as handed over by the persistence collaborator.
///
/// Every field is optional; external exports disagree on key names, so the
/// serde alias table maps the common variants onto canonical fields. Rows
/// with no usable descriptive name are dropped at index build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRow {
    #[serde(alias = "ProductName")]
    pub product_name: Option<String>,
    #[serde(alias = "Name")]
    pub name: Option<String>,
    #[serde(alias = "itemName")]
    pub item_name: Option<String>,
    #[serde(alias = "Description")]
    pub description: Option<String>,
    #[serde(alias = "supplier", alias = "producer")]
    pub vendor: Option<String>,
    pub brand: Option<String>,
    #[serde(alias = "type", alias = "category", alias = "inventory_type")]
    pub product_type: Option<String>,
    #[serde(alias = "genetics")]
    pub lineage: Option<String>,
    #[serde(alias = "strain_name")]
    pub strain: Option<String>,
}

impl CatalogRow {
    /// Best available descriptive name, checked in a fixed preference
    /// order. The boolean is true when the generic description field was
    /// the only fallback, which subjects the row to the sample-marker drop.
    pub fn display_name(&self) -> Option<(&str, bool)> {
        for field in [&self.product_name, &self.name, &self.item_name] {
            if let Some(value) = non_empty(field) {
                return Some((value, false));
            }
        }
        non_empty(&self.description).map(|value| (value, true))
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Genetic-classification category, drawn from a fixed enumerated set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lineage {
    #[serde(rename = "SATIVA")]
    Sativa,
    #[serde(rename = "INDICA")]
    Indica,
    #[serde(rename = "HYBRID")]
    Hybrid,
    #[serde(rename = "HYBRID/SATIVA")]
    HybridSativa,
    #[serde(rename = "HYBRID/INDICA")]
    HybridIndica,
    #[serde(rename = "CBD")]
    Cbd,
    #[serde(rename = "MIXED")]
    Mixed,
    #[serde(rename = "PARAPHERNALIA")]
    Paraphernalia,
}

impl Lineage {
    /// Parse a lineage tag, tolerating case and separator noise.
    pub fn parse(value: &str) -> Option<Self> {
        let cleaned = value.trim().to_uppercase().replace(['-', '_', ' '], "/");
        match cleaned.as_str() {
            "SATIVA" => Some(Lineage::Sativa),
            "INDICA" => Some(Lineage::Indica),
            "HYBRID" => Some(Lineage::Hybrid),
            "HYBRID/SATIVA" | "SATIVA/HYBRID" => Some(Lineage::HybridSativa),
            "HYBRID/INDICA" | "INDICA/HYBRID" => Some(Lineage::HybridIndica),
            "CBD" => Some(Lineage::Cbd),
            "MIXED" => Some(Lineage::Mixed),
            "PARAPHERNALIA" => Some(Lineage::Paraphernalia),
            _ => None,
        }
    }

    /// Sanitize an optional source value into the fixed set; absent or
    /// unrecognized values become `MIXED`.
    pub fn sanitize(value: Option<&str>) -> Self {
        value.and_then(Lineage::parse).unwrap_or(Lineage::Mixed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Lineage::Sativa => "SATIVA",
            Lineage::Indica => "INDICA",
            Lineage::Hybrid => "HYBRID",
            Lineage::HybridSativa => "HYBRID/SATIVA",
            Lineage::HybridIndica => "HYBRID/INDICA",
            Lineage::Cbd => "CBD",
            Lineage::Mixed => "MIXED",
            Lineage::Paraphernalia => "PARAPHERNALIA",
        }
    }
}

impl std::fmt::Display for Lineage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One indexed catalog product. Owned exclusively by the index arena and
/// addressed by its stable integer position; never mutated after build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogEntry {
    pub index: usize,
    pub display_name: String,
    pub normalized_name: String,
    pub tokens: BTreeSet<String>,
    pub key_terms: BTreeSet<String>,
    /// Lowercased vendor key; explicit row field when present, otherwise
    /// extracted from the display name.
    pub vendor: Option<String>,
    pub brand: Option<String>,
    pub product_type: Option<String>,
    pub lineage: Option<String>,
    pub strain: Option<String>,
}

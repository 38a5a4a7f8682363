use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tolerant deserialization for numeric fields external systems encode as
/// numbers, strings, or nulls. Unparseable strings coerce to `None` rather
/// than failing the item.
mod flex_number {
    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(f64),
            Text(String),
            None,
        }

        Ok(match Option::<Raw>::deserialize(deserializer)? {
            Some(Raw::Number(n)) => Some(n),
            Some(Raw::Text(s)) => s.trim().trim_start_matches('$').parse().ok(),
            Some(Raw::None) | None => None,
        })
    }
}

/// Top-level manifest payload: a list of items plus whatever identifying
/// metadata the sender includes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestPayload {
    #[serde(alias = "manifest_id", alias = "transfer_id")]
    pub id: Option<String>,
    #[serde(alias = "from", alias = "shipper", alias = "from_license_name")]
    pub sender: Option<String>,
    #[serde(
        alias = "inventory",
        alias = "line_items",
        alias = "inventory_transfer_items"
    )]
    pub items: Option<Vec<ManifestItem>>,
}

/// One transferred inventory item, loosely structured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestItem {
    #[serde(alias = "product_name", alias = "item_name")]
    pub name: Option<String>,
    #[serde(alias = "supplier", alias = "producer", alias = "vendor_name")]
    pub vendor: Option<String>,
    pub brand: Option<String>,
    #[serde(alias = "strain_name")]
    pub strain: Option<String>,
    #[serde(alias = "genetics")]
    pub lineage: Option<String>,
    #[serde(alias = "type", alias = "category", alias = "inventory_type")]
    pub product_type: Option<String>,
    #[serde(deserialize_with = "flex_number::deserialize", alias = "unit_price", alias = "price_per_unit")]
    pub price: Option<f64>,
    #[serde(deserialize_with = "flex_number::deserialize", alias = "qty", alias = "unit_weight")]
    pub weight: Option<f64>,
    #[serde(alias = "uom", alias = "weight_unit", alias = "unit_of_measure")]
    pub unit: Option<String>,
    #[serde(alias = "lab_result", alias = "potency", alias = "lab_results")]
    pub lab_result: Option<LabResults>,
}

impl ManifestItem {
    /// Trimmed name when one is present and non-empty. Items without a
    /// usable name are skipped by the orchestrator.
    pub fn usable_name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Raw weight rendered with its unit appended, when both are known.
    pub fn display_weight(&self) -> Option<String> {
        let weight = self.weight?;
        match self.unit.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            Some(unit) => Some(format!("{weight} {unit}")),
            None => Some(weight.to_string()),
        }
    }

    /// Cannabinoid totals extracted from the lab-result block, keyed by
    /// uppercased analyte tag (THC, THCA, CBD, ...).
    pub fn cannabinoids(&self) -> BTreeMap<String, f64> {
        let mut out = BTreeMap::new();
        let Some(lab) = &self.lab_result else {
            return out;
        };
        for result in &lab.results {
            let kind = result.kind.trim().to_uppercase();
            if kind.is_empty() {
                continue;
            }
            if let Some(value) = result.value {
                // First value per analyte wins; repeated rows are noise.
                out.entry(kind).or_insert(value);
            }
        }
        out
    }
}

/// Potency block attached to an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabResults {
    #[serde(alias = "potency_results", alias = "potency")]
    pub results: Vec<PotencyResult>,
    #[serde(alias = "coa", alias = "coa_url", alias = "certificate")]
    pub coa_link: Option<String>,
}

/// A single `{type, value[, unit]}` potency entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PotencyResult {
    #[serde(alias = "type", alias = "result_type", alias = "analyte")]
    pub kind: String,
    #[serde(deserialize_with = "flex_number::deserialize")]
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_and_flexible_numbers_deserialize() {
        let item: ManifestItem = serde_json::from_str(
            r#"{
                "product_name": "Grape Gas Rosin",
                "supplier": "Dank Czar",
                "unit_price": "$25.00",
                "qty": 1.0,
                "uom": "g",
                "lab_result": {
                    "potency_results": [
                        {"type": "THC", "value": "21.3", "unit": "%"},
                        {"type": "cbd", "value": 0.4}
                    ],
                    "coa": "https://lab.example/coa/123"
                }
            }"#,
        )
        .unwrap();

        assert_eq!(item.usable_name(), Some("Grape Gas Rosin"));
        assert_eq!(item.vendor.as_deref(), Some("Dank Czar"));
        assert_eq!(item.price, Some(25.0));
        assert_eq!(item.display_weight().as_deref(), Some("1 g"));

        let potency = item.cannabinoids();
        assert_eq!(potency.get("THC"), Some(&21.3));
        assert_eq!(potency.get("CBD"), Some(&0.4));
        assert_eq!(
            item.lab_result.unwrap().coa_link.as_deref(),
            Some("https://lab.example/coa/123")
        );
    }

    #[test]
    fn garbage_numbers_coerce_to_none() {
        let item: ManifestItem =
            serde_json::from_str(r#"{"name": "x", "price": "call for pricing"}"#).unwrap();
        assert_eq!(item.price, None);
    }

    #[test]
    fn blank_names_are_unusable() {
        let item: ManifestItem = serde_json::from_str(r#"{"name": "   "}"#).unwrap();
        assert_eq!(item.usable_name(), None);
        assert_eq!(ManifestItem::default().usable_name(), None);
    }

    #[test]
    fn missing_item_list_is_none() {
        let payload: ManifestPayload =
            serde_json::from_str(r#"{"manifest_id": "m-1"}"#).unwrap();
        assert!(payload.items.is_none());

        let payload: ManifestPayload =
            serde_json::from_str(r#"{"line_items": [{"name": "a"}]}"#).unwrap();
        assert_eq!(payload.items.unwrap().len(), 1);
    }
}

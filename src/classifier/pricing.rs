use crate::classifier::interpreter::{Category, Classification};
use serde::Serialize;
use std::collections::HashMap;

/// Label returned in place of the category when nothing is paid for it
pub const NON_RECYCLABLE_LABEL: &str = "Non-recyclable";

/// Immutable category -> price per kilogram table, built once at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingTable {
    prices: HashMap<Category, u32>,
}

impl Default for PricingTable {
    fn default() -> Self {
        let prices = HashMap::from([
            (Category::Plastic, 30),
            (Category::Paper, 10),
            (Category::Metal, 50),
            (Category::Glass, 20),
            (Category::Organic, 0),
            (Category::Other, 0),
        ]);
        Self { prices }
    }
}

impl PricingTable {
    /// Default table with per-category overrides applied.
    ///
    /// Override keys are category names, matched case-insensitively.
    pub fn with_overrides(overrides: &HashMap<String, u32>) -> anyhow::Result<Self> {
        let mut table = Self::default();
        for (name, price) in overrides {
            let category: Category = name
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid pricing override: {}", e))?;
            table.prices.insert(category, *price);
        }
        Ok(table)
    }

    /// Price per kilogram; 0 for anything not in the table
    pub fn price_per_kg(&self, category: Category) -> u32 {
        self.prices.get(&category).copied().unwrap_or(0)
    }

    pub fn is_recyclable(&self, category: Category) -> bool {
        self.price_per_kg(category) > 0
    }

    /// Derive the response payload for a classification
    pub fn resolve(&self, classification: &Classification, model: &str) -> ClassificationResult {
        let price_per_kg = self.price_per_kg(classification.category);
        let recyclable = price_per_kg > 0;

        let label = if recyclable {
            classification.category.as_str()
        } else {
            NON_RECYCLABLE_LABEL
        };

        ClassificationResult {
            label: label.to_string(),
            confidence: round2(classification.confidence),
            recyclable,
            price_per_kg,
            debug: DebugInfo {
                reasoning: classification.reasoning.clone(),
                model: model.to_string(),
            },
        }
    }

    /// Entries in fixed category order, for display
    pub fn entries(&self) -> impl Iterator<Item = (Category, u32)> + '_ {
        Category::ALL
            .into_iter()
            .map(move |category| (category, self.price_per_kg(category)))
    }
}

/// Response payload of `POST /classify`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    /// Category name, or "Non-recyclable" when the price is zero
    #[serde(rename = "class")]
    pub label: String,
    /// Rounded to 2 decimals
    pub confidence: f64,
    pub recyclable: bool,
    pub price_per_kg: u32,
    pub debug: DebugInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugInfo {
    pub reasoning: String,
    pub model: String,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

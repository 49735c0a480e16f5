use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, ItemId};
use crate::errors::EngineError;

/// Named weight vector controlling which factor dominates the ranking.
/// A closed enumeration: unknown strategy strings are rejected before any
/// computation runs rather than silently defaulting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Balanced,
    Upsell,
    CrossSell,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Balanced => "balanced",
            Strategy::Upsell => "upsell",
            Strategy::CrossSell => "cross_sell",
        }
    }

    /// Factor weights for this strategy. Each vector sums to 1.0.
    pub fn weights(&self) -> StrategyWeights {
        match self {
            Strategy::Balanced => StrategyWeights {
                category: 0.35,
                margin: 0.30,
                co_purchase: 0.20,
                popularity: 0.10,
                context: 0.05,
            },
            Strategy::Upsell => StrategyWeights {
                category: 0.30,
                margin: 0.45,
                co_purchase: 0.15,
                popularity: 0.05,
                context: 0.05,
            },
            Strategy::CrossSell => StrategyWeights {
                category: 0.25,
                margin: 0.20,
                co_purchase: 0.35,
                popularity: 0.10,
                context: 0.10,
            },
        }
    }

    /// Cross-sell ranks co-purchase strength by lift rather than confidence,
    /// favoring pairings stronger than the partner's base popularity.
    pub fn uses_lift(&self) -> bool {
        matches!(self, Strategy::CrossSell)
    }
}

impl FromStr for Strategy {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "balanced" => Ok(Strategy::Balanced),
            "upsell" => Ok(Strategy::Upsell),
            "cross_sell" | "cross-sell" => Ok(Strategy::CrossSell),
            other => Err(EngineError::Validation(format!(
                "unknown strategy `{other}` (expected balanced|upsell|cross_sell)"
            ))),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrategyWeights {
    pub category: f64,
    pub margin: f64,
    pub co_purchase: f64,
    pub popularity: f64,
    pub context: f64,
}

/// The five normalized factor scores for one candidate, each in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorScores {
    pub category: f64,
    pub margin: f64,
    pub co_purchase: f64,
    pub popularity: f64,
    pub context: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    Category,
    Margin,
    CoPurchase,
    Popularity,
    Context,
}

/// Strategic base score per quadrant: stars get pushed hardest, puzzles are
/// worth surfacing, dogs are almost never recommended. Exhaustive so a new
/// category cannot ship without a weight.
pub fn category_weight(category: Category) -> f64 {
    match category {
        Category::Star => 1.0,
        Category::Puzzle => 0.8,
        Category::Plowhorse => 0.5,
        Category::Dog => 0.1,
        Category::Unclassified => 0.3,
    }
}

/// Transient ranking output. Never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationCandidate {
    pub item_id: ItemId,
    pub title: String,
    /// Composite weighted score in `[0, 1]`.
    pub score: f64,
    /// The factor that contributed the largest weighted share.
    pub dominant_factor: Factor,
    pub reason: String,
    pub factor_scores: FactorScores,
}

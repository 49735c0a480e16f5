use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    /// Parse an identifier from untrusted input. Malformed identifiers are a
    /// validation failure, rejected before any computation runs.
    pub fn parse(raw: &str) -> Result<Self, EngineError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| EngineError::Validation(format!("malformed item id `{raw}`")))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SectionId(pub Uuid);

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Menu-engineering matrix quadrant, crossing popularity against margin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Unclassified,
    Star,
    Puzzle,
    Plowhorse,
    Dog,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Unclassified,
        Category::Star,
        Category::Puzzle,
        Category::Plowhorse,
        Category::Dog,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Unclassified => "unclassified",
            Category::Star => "star",
            Category::Puzzle => "puzzle",
            Category::Plowhorse => "plowhorse",
            Category::Dog => "dog",
        }
    }
}

impl FromStr for Category {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "unclassified" => Ok(Category::Unclassified),
            "star" => Ok(Category::Star),
            "puzzle" => Ok(Category::Puzzle),
            "plowhorse" => Ok(Category::Plowhorse),
            "dog" => Ok(Category::Dog),
            other => Err(EngineError::Validation(format!(
                "unknown category `{other}` (expected unclassified|star|puzzle|plowhorse|dog)"
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable view of one sellable item at analysis time. Owned by the
/// persistence collaborator; the engine reads it and proposes updated
/// `category`/`confidence` values for write-back after a classification run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItemSnapshot {
    pub id: ItemId,
    pub title: String,
    pub section_id: Option<SectionId>,
    pub price: Decimal,
    /// Production cost. `None` when the kitchen has not costed the item yet.
    pub cost: Option<Decimal>,
    pub total_purchases: u64,
    pub total_revenue: Decimal,
    pub total_profit: Decimal,
    pub category: Category,
    pub confidence: Option<f64>,
    pub active: bool,
}

impl MenuItemSnapshot {
    /// Absolute margin, `price - cost`. Unknown when the item has no cost data.
    pub fn margin(&self) -> Option<Decimal> {
        self.cost.map(|cost| self.price - cost)
    }

    /// Margin as a fraction of price, e.g. `0.60` for a 60% margin.
    /// Zero-priced items report `0.0`; items without cost data report `None`
    /// and are handled by the classifier's missing-data rule.
    pub fn margin_percent(&self) -> Option<f64> {
        let margin = self.margin()?;
        if self.price.is_zero() {
            return Some(0.0);
        }
        Some((margin / self.price).to_f64().unwrap_or(0.0))
    }
}

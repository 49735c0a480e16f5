//! Menu-engineering matrix classification.
//!
//! Buckets an item into star/puzzle/plowhorse/dog by crossing purchase
//! volume against margin percentage, both compared to population thresholds
//! computed per run. Deterministic and threshold-based by design: managers
//! need to be able to see exactly why an item landed where it did.

use serde::{Deserialize, Serialize};

use crate::domain::{Category, MenuItemSnapshot};
use crate::stats::AggregateStats;

/// Confidence never drops below this floor; a 0.0 label would read as "no
/// classification" rather than "borderline classification".
pub const CONFIDENCE_FLOOR: f64 = 0.05;

/// Items that have never sold get at most this confidence, flagging the
/// cold-start uncertainty to the manager even when the margin axis is clear.
pub const COLD_START_CONFIDENCE_CAP: f64 = 0.90;

/// Multiplier on the margin distance term when cost data is missing.
pub const MISSING_COST_DISCOUNT: f64 = 0.5;

/// Margin fraction assumed for items without cost data, so missing data
/// never pushes an item toward the low-margin quadrants.
pub const BEST_CASE_MARGIN: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    /// Normalized distance from both thresholds in `[0.05, 1.0]`. Items far
    /// from either boundary get high confidence; near-boundary items get low
    /// confidence, signaling that the label is borderline.
    pub confidence: f64,
}

/// Classify one item against the supplied per-run thresholds.
///
/// Ties resolve toward the higher-value category: an item sitting exactly on
/// both thresholds is a star.
pub fn classify(item: &MenuItemSnapshot, stats: &AggregateStats) -> Classification {
    let purchases = item.total_purchases as f64;
    let (margin_percent, margin_known) = match item.margin_percent() {
        Some(percent) => (percent, true),
        None => (BEST_CASE_MARGIN, false),
    };

    let high_popularity = purchases >= stats.purchase_threshold;
    let high_margin = margin_percent >= stats.margin_threshold;

    let category = match (high_popularity, high_margin) {
        (true, true) => Category::Star,
        (true, false) => Category::Plowhorse,
        (false, true) => Category::Puzzle,
        (false, false) => Category::Dog,
    };

    let cold_start = item.total_purchases == 0;
    let purchase_distance =
        if cold_start { 1.0 } else { normalized_distance(purchases, stats.purchase_threshold) };
    let mut margin_distance = normalized_distance(margin_percent, stats.margin_threshold);
    if !margin_known {
        margin_distance *= MISSING_COST_DISCOUNT;
    }

    let mut confidence =
        ((purchase_distance + margin_distance) / 2.0).clamp(CONFIDENCE_FLOOR, 1.0);
    if cold_start {
        confidence = confidence.min(COLD_START_CONFIDENCE_CAP);
    }

    Classification { category, confidence }
}

/// Distance from a threshold as a fraction of the threshold, capped at one
/// full threshold-width. A zero threshold means every value is maximally far.
fn normalized_distance(value: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 1.0;
    }
    ((value - threshold).abs() / threshold).min(1.0)
}

/// Playbook of manager actions per quadrant. Exhaustive over `Category` so a
/// new quadrant cannot ship without an answer here.
pub fn suggested_actions(category: Category) -> &'static [&'static str] {
    match category {
        Category::Star => &[
            "Maintain current pricing and positioning",
            "Feature prominently on the menu",
            "Use as an anchor for bundle deals",
        ],
        Category::Puzzle => &[
            "Move to a more prominent menu position",
            "Train staff to actively recommend this item",
            "Add to popular bundle combinations",
        ],
        Category::Plowhorse => &[
            "Increase price by 5-10%; popular items tolerate increases",
            "Add premium add-ons to lift the margin",
            "Review supplier costs for reduction opportunities",
        ],
        Category::Dog => &[
            "Test a 10-15% price reduction to gauge demand",
            "Consider removing or rebranding this item",
            "Move to a less prominent menu position",
        ],
        Category::Unclassified => &["Run a classification pass before acting on this item"],
    }
}

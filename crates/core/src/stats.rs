//! Population-level statistics for a classification run.

use serde::{Deserialize, Serialize};

use crate::domain::MenuItemSnapshot;
use crate::errors::EngineError;

/// Fallback profitability boundary when no active item has cost data, so a
/// run over an uncosted menu can still classify on the popularity axis.
pub const DEFAULT_MARGIN_THRESHOLD: f64 = 0.30;

/// Per-run value object. Never persisted and never ambient: it is recomputed
/// from the live active set on every classification run and passed into the
/// classifier as an explicit parameter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Median of `total_purchases` across the active population.
    pub purchase_threshold: f64,
    /// Median margin fraction across active items with known cost.
    pub margin_threshold: f64,
    pub population_size: usize,
}

/// Compute classification thresholds over a snapshot of the active item set.
///
/// Medians rather than means, so a runaway bestseller cannot drag the
/// popularity boundary above the rest of the menu. Items without cost data
/// are excluded from the margin median but remain classifiable downstream.
pub fn compute_stats(active_items: &[MenuItemSnapshot]) -> Result<AggregateStats, EngineError> {
    if active_items.is_empty() {
        return Err(EngineError::InsufficientData(
            "no active menu items to derive thresholds from".to_string(),
        ));
    }

    let purchases: Vec<f64> = active_items.iter().map(|item| item.total_purchases as f64).collect();
    let margins: Vec<f64> = active_items.iter().filter_map(MenuItemSnapshot::margin_percent).collect();

    let purchase_threshold = median(purchases);
    let margin_threshold = if margins.is_empty() { DEFAULT_MARGIN_THRESHOLD } else { median(margins) };

    Ok(AggregateStats { purchase_threshold, margin_threshold, population_size: active_items.len() })
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

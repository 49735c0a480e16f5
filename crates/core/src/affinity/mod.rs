//! Market-basket analysis over completed order history.
//!
//! Produces directional support/confidence/lift statistics for every item
//! pair that co-occurs in an order. The full rebuild is O(orders x
//! itemsPerOrder^2); it is meant to run as a periodic batch behind the
//! result cache, never per request.

mod analyzer;

pub use analyzer::{AffinityEntry, AffinityMap, Association, CoPurchaseAnalyzer};

use serde::{Deserialize, Serialize};

/// Pairs seen in fewer than 1% of orders are noise for a single restaurant's
/// volume and are pruned from the map.
pub const DEFAULT_MIN_SUPPORT: f64 = 0.01;

/// Directed rules weaker than a 10% conditional probability are pruned.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.10;

/// Pruning floors for the analyzer. `unpruned()` keeps every pair, which is
/// what invariant-style tests want.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub min_support: f64,
    pub min_confidence: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self { min_support: DEFAULT_MIN_SUPPORT, min_confidence: DEFAULT_MIN_CONFIDENCE }
    }
}

impl AnalyzerConfig {
    pub fn unpruned() -> Self {
        Self { min_support: 0.0, min_confidence: 0.0 }
    }
}

//! Multi-factor recommendation scoring.
//!
//! Fuses the classifier's categories with the co-purchase affinity structure
//! and item metadata to rank candidates for a cart, under a selectable
//! strategy that decides which factor dominates.

mod scorer;
mod types;

pub use scorer::recommend;
pub use types::{
    category_weight, Factor, FactorScores, RecommendationCandidate, Strategy, StrategyWeights,
};

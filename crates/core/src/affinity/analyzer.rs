use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::AnalyzerConfig;
use crate::domain::{ItemId, OrderRecord};
use crate::errors::EngineError;

/// One directional association rule `A -> B`. `A -> B` and `B -> A` are
/// always distinct entries: confidence and lift are conditional on the
/// antecedent and collapsing them would lose that information.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AffinityEntry {
    /// Orders containing both items.
    pub pair_count: u64,
    /// P(A and B): pair count over total orders.
    pub support: f64,
    /// P(B | A): pair count over orders containing A.
    pub confidence: f64,
    /// confidence over P(B); 1.0 means A tells you nothing about B.
    pub lift: f64,
}

/// A ranked partner for one item, ready for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Association {
    pub item_id: ItemId,
    pub pair_count: u64,
    pub confidence: f64,
    pub lift: f64,
    pub message: String,
}

/// The full directional co-purchase structure for one analyzer run. Rebuilt
/// wholesale on each run and read-only to every other component.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AffinityMap {
    entries: HashMap<(ItemId, ItemId), AffinityEntry>,
    item_order_counts: HashMap<ItemId, u64>,
    total_orders: u64,
}

impl AffinityMap {
    pub fn total_orders(&self) -> u64 {
        self.total_orders
    }

    /// Number of fulfilled orders containing the item at least once.
    pub fn order_count(&self, item: ItemId) -> u64 {
        self.item_order_counts.get(&item).copied().unwrap_or(0)
    }

    pub fn entry(&self, from: ItemId, to: ItemId) -> Option<&AffinityEntry> {
        self.entries.get(&(from, to))
    }

    /// Fails safe to zero for pairs that never co-occurred or were pruned.
    pub fn confidence(&self, from: ItemId, to: ItemId) -> f64 {
        self.entry(from, to).map(|entry| entry.confidence).unwrap_or(0.0)
    }

    pub fn lift(&self, from: ItemId, to: ItemId) -> f64 {
        self.entry(from, to).map(|entry| entry.lift).unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every partner of `item`, ranked by confidence, with ties broken by
    /// lift, then the partner's order count, then the partner id, so repeated
    /// calls over identical history return identical rankings.
    pub fn ranked_associations(&self, item: ItemId) -> Vec<Association> {
        let mut partners: Vec<(ItemId, &AffinityEntry)> = self
            .entries
            .iter()
            .filter(|((from, _), _)| *from == item)
            .map(|((_, to), entry)| (*to, entry))
            .collect();

        partners.sort_by(|a, b| {
            b.1.confidence
                .partial_cmp(&a.1.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.1.lift.partial_cmp(&a.1.lift).unwrap_or(std::cmp::Ordering::Equal))
                .then_with(|| self.order_count(b.0).cmp(&self.order_count(a.0)))
                .then_with(|| a.0.cmp(&b.0))
        });

        partners
            .into_iter()
            .map(|(to, entry)| Association {
                item_id: to,
                pair_count: entry.pair_count,
                confidence: entry.confidence,
                lift: entry.lift,
                message: pairing_message(entry.confidence),
            })
            .collect()
    }

    /// Top-`limit` partners for `item`. An item that never co-occurred with
    /// anything yields an empty list, which is an answer, not an error.
    pub fn frequently_bought_with(&self, item: ItemId, limit: usize) -> Vec<Association> {
        let mut ranked = self.ranked_associations(item);
        ranked.truncate(limit);
        ranked
    }
}

fn pairing_message(confidence: f64) -> String {
    let percent = (confidence * 100.0).round() as u32;
    format!("bought together in {percent}% of orders containing this item")
}

/// Builds the affinity structure from completed order history.
#[derive(Clone, Debug, Default)]
pub struct CoPurchaseAnalyzer {
    config: AnalyzerConfig,
}

impl CoPurchaseAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    /// Rebuild the full directional affinity map. The caller supplies only
    /// fulfilled orders; an empty history cannot support any association and
    /// is reported as insufficient data.
    pub fn build(&self, orders: &[OrderRecord]) -> Result<AffinityMap, EngineError> {
        if orders.is_empty() {
            return Err(EngineError::InsufficientData(
                "no completed orders to analyze".to_string(),
            ));
        }

        let total_orders = orders.len() as u64;
        let mut item_order_counts: HashMap<ItemId, u64> = HashMap::new();
        let mut pair_counts: HashMap<(ItemId, ItemId), u64> = HashMap::new();

        for order in orders {
            let items = order.unique_items();
            for &item in &items {
                *item_order_counts.entry(item).or_default() += 1;
            }
            for &from in &items {
                for &to in &items {
                    if from != to {
                        *pair_counts.entry((from, to)).or_default() += 1;
                    }
                }
            }
        }

        let mut entries = HashMap::new();
        for ((from, to), pair_count) in pair_counts {
            let support = pair_count as f64 / total_orders as f64;
            if support < self.config.min_support {
                continue;
            }

            let from_count = item_order_counts.get(&from).copied().unwrap_or(0);
            let confidence =
                if from_count == 0 { 0.0 } else { pair_count as f64 / from_count as f64 };
            if confidence < self.config.min_confidence {
                continue;
            }

            let to_count = item_order_counts.get(&to).copied().unwrap_or(0);
            let partner_rate = to_count as f64 / total_orders as f64;
            let lift = if partner_rate > 0.0 { confidence / partner_rate } else { 0.0 };

            entries.insert((from, to), AffinityEntry { pair_count, support, confidence, lift });
        }

        Ok(AffinityMap { entries, item_order_counts, total_orders })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{AffinityMap, CoPurchaseAnalyzer};
    use crate::affinity::AnalyzerConfig;
    use crate::domain::{ItemId, OrderId, OrderLine, OrderRecord};
    use crate::errors::EngineError;

    fn id(n: u128) -> ItemId {
        ItemId(Uuid::from_u128(n))
    }

    fn order(n: u128, items: &[ItemId]) -> OrderRecord {
        OrderRecord {
            id: OrderId(Uuid::from_u128(n)),
            ordered_at: Utc::now(),
            lines: items.iter().map(|&item_id| OrderLine { item_id, quantity: 1 }).collect(),
        }
    }

    /// Orders {A,B}, {A,B}, {A,C}: the reference history for directional
    /// confidence and support.
    fn reference_history() -> (ItemId, ItemId, ItemId, AffinityMap) {
        let (a, b, c) = (id(1), id(2), id(3));
        let orders =
            vec![order(10, &[a, b]), order(11, &[a, b]), order(12, &[a, c])];
        let map = CoPurchaseAnalyzer::new().build(&orders).expect("build");
        (a, b, c, map)
    }

    #[test]
    fn empty_history_is_insufficient_data() {
        let error = CoPurchaseAnalyzer::new().build(&[]).expect_err("should fail");
        assert!(matches!(error, EngineError::InsufficientData(_)));
    }

    #[test]
    fn single_item_orders_produce_no_pairs() {
        let orders = vec![order(1, &[id(1)]), order(2, &[id(2)])];
        let map = CoPurchaseAnalyzer::new().build(&orders).expect("build");

        assert!(map.is_empty());
        assert_eq!(map.total_orders(), 2);
        assert_eq!(map.order_count(id(1)), 1);
    }

    #[test]
    fn confidence_is_directional() {
        let (a, b, _, map) = reference_history();

        // A appears in 3 orders, B in 2, together in 2.
        assert!((map.confidence(a, b) - 2.0 / 3.0).abs() < 1e-9);
        assert!((map.confidence(b, a) - 1.0).abs() < 1e-9);

        let ab = map.entry(a, b).expect("A->B entry");
        assert!((ab.support - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(ab.pair_count, 2);
    }

    #[test]
    fn lift_compares_against_partner_base_rate() {
        let (a, b, c, map) = reference_history();

        // P(B) = 2/3, confidence(A->B) = 2/3 -> lift 1.0.
        assert!((map.lift(a, b) - 1.0).abs() < 1e-9);
        // P(C) = 1/3, confidence(A->C) = 1/3 -> lift 1.0.
        assert!((map.lift(a, c) - 1.0).abs() < 1e-9);
        // P(A) = 1, confidence(C->A) = 1 -> lift 1.0.
        assert!((map.lift(c, a) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn entries_satisfy_probability_invariants() {
        let (a, b, c, d) = (id(1), id(2), id(3), id(4));
        let orders =
            vec![order(1, &[a, b, c]), order(2, &[a, b]), order(3, &[b, c, d]), order(4, &[c])];
        let map =
            CoPurchaseAnalyzer::with_config(AnalyzerConfig::unpruned()).build(&orders).expect("build");

        for from in [a, b, c, d] {
            for to in [a, b, c, d] {
                if let Some(entry) = map.entry(from, to) {
                    assert!(entry.support >= 0.0 && entry.support <= 1.0);
                    assert!(entry.confidence >= 0.0 && entry.confidence <= 1.0);
                    assert!(entry.support <= entry.confidence + 1e-12);
                    assert!(entry.lift >= 0.0);
                }
            }
        }

        // Asymmetry whenever the antecedents have different order counts.
        assert_ne!(map.confidence(a, b), map.confidence(b, a));
    }

    #[test]
    fn pruning_floors_drop_weak_rules() {
        let (a, b) = (id(1), id(2));
        let mut orders = vec![order(1, &[a, b])];
        for n in 2..=20 {
            orders.push(order(n, &[a]));
        }

        // confidence(A->B) = 1/20 is below the 10% floor; B->A survives.
        let map = CoPurchaseAnalyzer::new().build(&orders).expect("build");
        assert!(map.entry(a, b).is_none());
        assert!(map.entry(b, a).is_some());
    }

    #[test]
    fn quantities_do_not_inflate_cooccurrence() {
        let (a, b) = (id(1), id(2));
        let orders = vec![OrderRecord {
            id: OrderId(Uuid::from_u128(1)),
            ordered_at: Utc::now(),
            lines: vec![
                OrderLine { item_id: a, quantity: 4 },
                OrderLine { item_id: b, quantity: 2 },
            ],
        }];

        let map = CoPurchaseAnalyzer::new().build(&orders).expect("build");
        assert_eq!(map.entry(a, b).expect("pair").pair_count, 1);
    }

    #[test]
    fn ranking_orders_by_confidence_then_lift_then_count_then_id() {
        let (a, b, c) = (id(1), id(2), id(3));
        // B pairs with A in 2 of A's 3 orders, C in 1 of 3.
        let orders = vec![order(1, &[a, b]), order(2, &[a, b]), order(3, &[a, c])];
        let map = CoPurchaseAnalyzer::new().build(&orders).expect("build");

        let ranked = map.frequently_bought_with(a, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item_id, b);
        assert_eq!(ranked[1].item_id, c);
        assert_eq!(ranked[0].message, "bought together in 67% of orders containing this item");
    }

    #[test]
    fn equal_confidence_and_lift_fall_back_to_identifier_order() {
        let (a, b, c) = (id(1), id(2), id(3));
        // B and C each pair with A exactly once and appear in one order each.
        let orders = vec![order(1, &[a, b]), order(2, &[a, c])];
        let map =
            CoPurchaseAnalyzer::with_config(AnalyzerConfig::unpruned()).build(&orders).expect("build");

        let ranked = map.frequently_bought_with(a, 5);
        assert_eq!(ranked.iter().map(|assoc| assoc.item_id).collect::<Vec<_>>(), vec![b, c]);
    }

    #[test]
    fn unknown_item_has_no_associations() {
        let (_, _, _, map) = reference_history();
        assert!(map.frequently_bought_with(id(99), 5).is_empty());
    }

    #[test]
    fn limit_caps_the_returned_partners() {
        let (a, b, c, d) = (id(1), id(2), id(3), id(4));
        let orders = vec![order(1, &[a, b, c, d]), order(2, &[a, b, c]), order(3, &[a, b])];
        let map = CoPurchaseAnalyzer::new().build(&orders).expect("build");

        assert_eq!(map.frequently_bought_with(a, 2).len(), 2);
    }
}

use std::collections::HashSet;

use super::types::{
    category_weight, Factor, FactorScores, RecommendationCandidate, Strategy,
};
use crate::affinity::AffinityMap;
use crate::domain::{Category, ItemId, MenuItemSnapshot, SectionId};
use crate::errors::EngineError;

/// Rank recommendation candidates for a cart.
///
/// The pool is the full set of known items; cart members and inactive items
/// are excluded before scoring, and every factor is normalized against the
/// surviving candidates. An empty cart is fine (the ranking degrades to
/// category and popularity); an empty pool after exclusion is `EmptyPool`.
pub fn recommend(
    cart: &[ItemId],
    pool: &[MenuItemSnapshot],
    affinity: &AffinityMap,
    strategy: Strategy,
    limit: usize,
) -> Result<Vec<RecommendationCandidate>, EngineError> {
    let cart_set: HashSet<ItemId> = cart.iter().copied().collect();
    let cart_sections: HashSet<SectionId> = pool
        .iter()
        .filter(|item| cart_set.contains(&item.id))
        .filter_map(|item| item.section_id)
        .collect();

    let candidates: Vec<&MenuItemSnapshot> =
        pool.iter().filter(|item| item.active && !cart_set.contains(&item.id)).collect();

    if candidates.is_empty() {
        return Err(EngineError::EmptyPool);
    }

    let max_margin = candidates
        .iter()
        .filter_map(|item| item.margin_percent())
        .fold(0.0_f64, f64::max);
    let max_purchases =
        candidates.iter().map(|item| item.total_purchases).max().unwrap_or(0) as f64;

    // Raw co-purchase signal per candidate: the strongest link to any cart
    // item. Confidence is already a probability; lift needs a pool-relative
    // normalization pass below.
    let raw_signals: Vec<f64> = candidates
        .iter()
        .map(|item| {
            cart.iter()
                .map(|&cart_item| {
                    if strategy.uses_lift() {
                        affinity.lift(cart_item, item.id)
                    } else {
                        affinity.confidence(cart_item, item.id)
                    }
                })
                .fold(0.0_f64, f64::max)
        })
        .collect();
    let max_signal = raw_signals.iter().copied().fold(0.0_f64, f64::max);

    let weights = strategy.weights();
    let mut scored: Vec<(RecommendationCandidate, &MenuItemSnapshot)> = candidates
        .iter()
        .zip(raw_signals)
        .map(|(item, raw_signal)| {
            let co_purchase = if strategy.uses_lift() {
                if max_signal > 0.0 {
                    raw_signal / max_signal
                } else {
                    0.0
                }
            } else {
                raw_signal
            };

            let scores = FactorScores {
                category: category_weight(item.category),
                margin: if max_margin > 0.0 {
                    (item.margin_percent().unwrap_or(0.0) / max_margin).clamp(0.0, 1.0)
                } else {
                    0.0
                },
                co_purchase,
                popularity: if max_purchases > 0.0 {
                    item.total_purchases as f64 / max_purchases
                } else {
                    0.0
                },
                context: match item.section_id {
                    Some(section) if cart_sections.contains(&section) => 1.0,
                    _ => 0.0,
                },
            };

            let weighted = [
                (Factor::Category, scores.category * weights.category),
                (Factor::Margin, scores.margin * weights.margin),
                (Factor::CoPurchase, scores.co_purchase * weights.co_purchase),
                (Factor::Popularity, scores.popularity * weights.popularity),
                (Factor::Context, scores.context * weights.context),
            ];
            let score: f64 = weighted.iter().map(|(_, share)| share).sum();
            let dominant_factor = weighted
                .iter()
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(factor, _)| *factor)
                .unwrap_or(Factor::Category);

            let candidate = RecommendationCandidate {
                item_id: item.id,
                title: item.title.clone(),
                score,
                dominant_factor,
                reason: reason_for(dominant_factor, item),
                factor_scores: scores,
            };
            (candidate, *item)
        })
        .collect();

    // Equal scores break by revenue then title so repeated calls over the
    // same input always rank identically.
    scored.sort_by(|(a, item_a), (b, item_b)| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| item_b.total_revenue.cmp(&item_a.total_revenue))
            .then_with(|| item_a.title.cmp(&item_b.title))
    });

    Ok(scored.into_iter().map(|(candidate, _)| candidate).take(limit).collect())
}

fn reason_for(factor: Factor, item: &MenuItemSnapshot) -> String {
    let reason = match factor {
        Factor::Category => match item.category {
            Category::Star => "A standout performer on this menu",
            Category::Puzzle => "A hidden gem worth discovering",
            Category::Plowhorse => "A reliable crowd pleaser",
            Category::Dog | Category::Unclassified => "Rounds out the selection",
        },
        Factor::Margin => "One of the best-value picks on the menu",
        Factor::CoPurchase => "Often ordered together with items in this cart",
        Factor::Popularity => "A customer favorite",
        Factor::Context => "From the same section as items in this cart",
    };
    reason.to_string()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::recommend;
    use crate::affinity::{AffinityMap, AnalyzerConfig, CoPurchaseAnalyzer};
    use crate::domain::{
        Category, ItemId, MenuItemSnapshot, OrderId, OrderLine, OrderRecord, SectionId,
    };
    use crate::errors::EngineError;
    use crate::recommend::types::{Factor, Strategy};

    fn id(n: u128) -> ItemId {
        ItemId(Uuid::from_u128(n))
    }

    struct ItemSpec {
        n: u128,
        title: &'static str,
        category: Category,
        margin_percent: f64,
        purchases: u64,
        revenue: i64,
        section: Option<u128>,
        active: bool,
    }

    impl Default for ItemSpec {
        fn default() -> Self {
            Self {
                n: 1,
                title: "Item",
                category: Category::Unclassified,
                margin_percent: 0.0,
                purchases: 0,
                revenue: 0,
                section: None,
                active: true,
            }
        }
    }

    fn item(spec: ItemSpec) -> MenuItemSnapshot {
        // Fix price at 10.00 and derive cost from the desired margin.
        let price = Decimal::new(1000, 2);
        let cost = price - price * Decimal::try_from(spec.margin_percent).unwrap_or_default();
        MenuItemSnapshot {
            id: id(spec.n),
            title: spec.title.to_string(),
            section_id: spec.section.map(|s| SectionId(Uuid::from_u128(s))),
            price,
            cost: Some(cost.round_dp(4)),
            total_purchases: spec.purchases,
            total_revenue: Decimal::new(spec.revenue, 2),
            total_profit: Decimal::ZERO,
            category: spec.category,
            confidence: None,
            active: spec.active,
        }
    }

    fn order(n: u128, items: &[ItemId]) -> OrderRecord {
        OrderRecord {
            id: OrderId(Uuid::from_u128(n)),
            ordered_at: Utc::now(),
            lines: items.iter().map(|&item_id| OrderLine { item_id, quantity: 1 }).collect(),
        }
    }

    #[test]
    fn empty_cart_ranks_star_first_under_balanced() {
        let pool = vec![
            item(ItemSpec {
                n: 1,
                title: "Truffle Fries",
                category: Category::Star,
                margin_percent: 0.5,
                purchases: 50,
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                n: 2,
                title: "Garden Salad",
                category: Category::Dog,
                margin_percent: 0.4,
                purchases: 40,
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                n: 3,
                title: "Duck Confit",
                category: Category::Puzzle,
                margin_percent: 0.45,
                purchases: 30,
                ..ItemSpec::default()
            }),
        ];

        let ranked =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Balanced, 5).expect("rank");

        assert_eq!(ranked[0].item_id, id(1));
        assert_eq!(ranked.len(), 3);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn cart_members_and_inactive_items_are_never_returned() {
        let pool = vec![
            item(ItemSpec { n: 1, title: "In Cart", purchases: 10, ..ItemSpec::default() }),
            item(ItemSpec {
                n: 2,
                title: "Retired",
                purchases: 90,
                active: false,
                ..ItemSpec::default()
            }),
            item(ItemSpec { n: 3, title: "Candidate", purchases: 5, ..ItemSpec::default() }),
        ];

        let ranked = recommend(&[id(1)], &pool, &AffinityMap::default(), Strategy::Balanced, 5)
            .expect("rank");

        let returned: Vec<ItemId> = ranked.iter().map(|c| c.item_id).collect();
        assert_eq!(returned, vec![id(3)]);
    }

    #[test]
    fn pool_emptied_by_exclusions_is_an_empty_pool_error() {
        let pool = vec![
            item(ItemSpec { n: 1, ..ItemSpec::default() }),
            item(ItemSpec { n: 2, active: false, ..ItemSpec::default() }),
        ];

        let error = recommend(&[id(1)], &pool, &AffinityMap::default(), Strategy::Balanced, 5)
            .expect_err("should fail");
        assert_eq!(error, EngineError::EmptyPool);
    }

    #[test]
    fn upsell_promotes_margin_over_popularity() {
        let pool = vec![
            item(ItemSpec {
                n: 1,
                title: "Rib-eye",
                category: Category::Plowhorse,
                margin_percent: 0.8,
                purchases: 10,
                ..ItemSpec::default()
            }),
            item(ItemSpec {
                n: 2,
                title: "House Burger",
                category: Category::Star,
                margin_percent: 0.2,
                purchases: 100,
                ..ItemSpec::default()
            }),
        ];

        let balanced =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Balanced, 5).expect("rank");
        let upsell =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Upsell, 5).expect("rank");

        assert_eq!(balanced[0].item_id, id(2));
        assert_eq!(upsell[0].item_id, id(1));
    }

    #[test]
    fn cross_sell_ranks_by_lift_instead_of_confidence() {
        let (cart_item, common, rare) = (id(1), id(2), id(3));
        let filler = id(9);

        // `common` pairs with the cart item often but is everywhere (lift 1);
        // `rare` pairs less often but far above its base rate (lift 2).
        let mut orders = Vec::new();
        for n in 0..4 {
            orders.push(order(100 + n, &[cart_item, common]));
        }
        for n in 0..2 {
            orders.push(order(200 + n, &[cart_item, rare]));
        }
        for n in 0..4 {
            orders.push(order(300 + n, &[common]));
        }
        for n in 0..2 {
            orders.push(order(400 + n, &[filler]));
        }
        let affinity = CoPurchaseAnalyzer::with_config(AnalyzerConfig::unpruned())
            .build(&orders)
            .expect("build");

        let pool = vec![
            item(ItemSpec { n: 1, title: "Cart Item", purchases: 10, ..ItemSpec::default() }),
            item(ItemSpec { n: 2, title: "Common Side", purchases: 10, ..ItemSpec::default() }),
            item(ItemSpec { n: 3, title: "Rare Pairing", purchases: 10, ..ItemSpec::default() }),
        ];

        let balanced =
            recommend(&[cart_item], &pool, &affinity, Strategy::Balanced, 5).expect("rank");
        let cross_sell =
            recommend(&[cart_item], &pool, &affinity, Strategy::CrossSell, 5).expect("rank");

        assert_eq!(balanced[0].item_id, common);
        assert_eq!(cross_sell[0].item_id, rare);
    }

    #[test]
    fn shared_section_contributes_the_context_factor() {
        let pool = vec![
            item(ItemSpec { n: 1, title: "Cart Item", section: Some(7), ..ItemSpec::default() }),
            item(ItemSpec { n: 2, title: "Same Section", section: Some(7), ..ItemSpec::default() }),
            item(ItemSpec { n: 3, title: "Other Section", section: Some(8), ..ItemSpec::default() }),
        ];

        let ranked = recommend(&[id(1)], &pool, &AffinityMap::default(), Strategy::Balanced, 5)
            .expect("rank");

        assert_eq!(ranked[0].item_id, id(2));
        assert_eq!(ranked[0].factor_scores.context, 1.0);
        assert_eq!(ranked[1].factor_scores.context, 0.0);
    }

    #[test]
    fn equal_scores_break_by_revenue_then_title() {
        let pool = vec![
            item(ItemSpec { n: 1, title: "Banana Split", revenue: 5000, ..ItemSpec::default() }),
            item(ItemSpec { n: 2, title: "Apple Crumble", revenue: 5000, ..ItemSpec::default() }),
            item(ItemSpec { n: 3, title: "Zucchini Chips", revenue: 9000, ..ItemSpec::default() }),
        ];

        let first =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Balanced, 5).expect("rank");
        let second =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Balanced, 5).expect("rank");

        let order: Vec<&str> = first.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(order, vec!["Zucchini Chips", "Apple Crumble", "Banana Split"]);
        assert_eq!(first, second);
    }

    #[test]
    fn limit_caps_the_ranking() {
        let pool: Vec<MenuItemSnapshot> = (1..=6)
            .map(|n| item(ItemSpec { n, purchases: n as u64, ..ItemSpec::default() }))
            .collect();

        let ranked =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Balanced, 2).expect("rank");
        assert_eq!(ranked.len(), 2);
    }

    #[test]
    fn reason_follows_the_dominant_factor() {
        let pool = vec![item(ItemSpec {
            n: 1,
            title: "Truffle Fries",
            category: Category::Star,
            margin_percent: 0.1,
            purchases: 10,
            ..ItemSpec::default()
        })];

        let ranked =
            recommend(&[], &pool, &AffinityMap::default(), Strategy::Balanced, 5).expect("rank");

        assert_eq!(ranked[0].dominant_factor, Factor::Category);
        assert_eq!(ranked[0].reason, "A standout performer on this menu");
    }

    #[test]
    fn scores_stay_in_unit_range() {
        let pool = vec![
            item(ItemSpec {
                n: 1,
                category: Category::Star,
                margin_percent: 0.9,
                purchases: 500,
                section: Some(7),
                ..ItemSpec::default()
            }),
            item(ItemSpec { n: 2, section: Some(7), ..ItemSpec::default() }),
        ];

        let ranked = recommend(&[id(2)], &pool, &AffinityMap::default(), Strategy::CrossSell, 5)
            .expect("rank");

        for candidate in ranked {
            assert!(candidate.score >= 0.0 && candidate.score <= 1.0);
        }
    }
}

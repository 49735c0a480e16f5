//! Service facade exposed to the serving layer.
//!
//! Owns the collaborator handles and the result caches, validates inputs
//! before any computation runs, and maps engine outcomes to the operation
//! results callers consume. All heavy lifting happens in the pure modules.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::affinity::{AffinityMap, AnalyzerConfig, Association, CoPurchaseAnalyzer};
use crate::cache::TtlCache;
use crate::classifier::{classify, suggested_actions};
use crate::config::EngineConfig;
use crate::domain::{Category, ItemId, MenuItemSnapshot};
use crate::errors::{EngineError, ServiceError};
use crate::recommend::{recommend, RecommendationCandidate, Strategy};
use crate::stats::compute_stats;
use crate::store::{MenuItemStore, OrderStore};

const AFFINITY_CACHE_KEY: &str = "affinity";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedItem {
    pub item_id: ItemId,
    pub title: String,
    pub category: Category,
    pub confidence: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationOutcome {
    pub item: ClassifiedItem,
    pub suggested_actions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassificationFailure {
    pub item_id: ItemId,
    pub title: String,
    pub error: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BulkClassificationOutcome {
    pub classified: Vec<ClassifiedItem>,
    pub failed: Vec<ClassificationFailure>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: Category,
    pub count: usize,
    pub total_revenue: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MenuItemStats {
    pub total_items: usize,
    pub per_category: Vec<CategoryBreakdown>,
}

/// A frequently-bought-together partner resolved against the live menu.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub item_id: ItemId,
    pub title: String,
    pub confidence: f64,
    pub lift: f64,
    pub message: String,
}

pub struct MenuIntelligence {
    items: Arc<dyn MenuItemStore>,
    orders: Arc<dyn OrderStore>,
    analyzer: CoPurchaseAnalyzer,
    config: EngineConfig,
    affinity_cache: TtlCache<&'static str, Arc<AffinityMap>, ServiceError>,
    pairing_cache: TtlCache<ItemId, Arc<Vec<Association>>, ServiceError>,
}

impl MenuIntelligence {
    pub fn new(items: Arc<dyn MenuItemStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self::with_config(items, orders, EngineConfig::default())
    }

    pub fn with_config(
        items: Arc<dyn MenuItemStore>,
        orders: Arc<dyn OrderStore>,
        config: EngineConfig,
    ) -> Self {
        let analyzer = CoPurchaseAnalyzer::with_config(AnalyzerConfig {
            min_support: config.min_support,
            min_confidence: config.min_confidence,
        });
        Self {
            items,
            orders,
            analyzer,
            config,
            affinity_cache: TtlCache::new(),
            pairing_cache: TtlCache::new(),
        }
    }

    /// Classify one item against thresholds computed from the current active
    /// population, persist the result, and return the manager playbook.
    pub async fn classify_item(&self, raw_id: &str) -> Result<ClassificationOutcome, ServiceError> {
        let id = ItemId::parse(raw_id)?;
        let item = self
            .items
            .find_item(&id)
            .await?
            .ok_or_else(|| ServiceError::ItemNotFound(raw_id.to_string()))?;

        let active = self.items.list_active_items().await?;
        let stats = compute_stats(&active)?;
        let classification = classify(&item, &stats);

        self.items
            .update_classification(&id, classification.category, classification.confidence)
            .await?;
        tracing::info!(
            item_id = %id,
            category = %classification.category,
            confidence = classification.confidence,
            "classified menu item"
        );

        Ok(ClassificationOutcome {
            item: ClassifiedItem {
                item_id: id,
                title: item.title,
                category: classification.category,
                confidence: classification.confidence,
            },
            suggested_actions: suggested_actions(classification.category)
                .iter()
                .map(|action| action.to_string())
                .collect(),
        })
    }

    /// Classify the whole active menu in one run. Thresholds are computed
    /// once, then each item is classified and written back independently: a
    /// failed write is collected and logged, and never aborts its siblings.
    ///
    /// Rerunning immediately on unchanged input is idempotent; rerunning
    /// after the population changed may relabel other items, because the
    /// thresholds track the live menu.
    pub async fn classify_all(&self) -> Result<BulkClassificationOutcome, ServiceError> {
        let active = self.items.list_active_items().await?;
        let stats = compute_stats(&active)?;

        let mut classified = Vec::with_capacity(active.len());
        let mut failed = Vec::new();

        for item in &active {
            let classification = classify(item, &stats);
            match self
                .items
                .update_classification(&item.id, classification.category, classification.confidence)
                .await
            {
                Ok(()) => classified.push(ClassifiedItem {
                    item_id: item.id,
                    title: item.title.clone(),
                    category: classification.category,
                    confidence: classification.confidence,
                }),
                Err(error) => {
                    tracing::warn!(item_id = %item.id, %error, "classification write-back failed");
                    failed.push(ClassificationFailure {
                        item_id: item.id,
                        title: item.title.clone(),
                        error: error.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            classified = classified.len(),
            failed = failed.len(),
            population = stats.population_size,
            purchase_threshold = stats.purchase_threshold,
            margin_threshold = stats.margin_threshold,
            "bulk classification run complete"
        );

        Ok(BulkClassificationOutcome { classified, failed })
    }

    /// Per-category counts and revenue over the active menu. Every category
    /// appears, including empty ones.
    pub async fn item_stats(&self) -> Result<MenuItemStats, ServiceError> {
        let active = self.items.list_active_items().await?;

        let per_category = Category::ALL
            .iter()
            .map(|&category| {
                let members = active.iter().filter(|item| item.category == category);
                CategoryBreakdown {
                    category,
                    count: members.clone().count(),
                    total_revenue: members.map(|item| item.total_revenue).sum(),
                }
            })
            .collect();

        Ok(MenuItemStats { total_items: active.len(), per_category })
    }

    /// Top partners for one item, resolved to live active items. Cached per
    /// item for 30 minutes on top of the shared affinity structure.
    pub async fn frequently_bought_with(
        &self,
        raw_id: &str,
        limit: usize,
    ) -> Result<Vec<Pairing>, ServiceError> {
        let id = ItemId::parse(raw_id)?;
        let affinity = self.affinity().await?;

        let associations = self
            .pairing_cache
            .get_or_compute(id, self.config.pairing_ttl(), || async move {
                Ok(Arc::new(affinity.ranked_associations(id)))
            })
            .await?;

        let active = self.items.list_active_items().await?;
        let titles: HashMap<ItemId, &str> =
            active.iter().map(|item| (item.id, item.title.as_str())).collect();

        // Partners that have since gone inactive are dropped, not surfaced.
        Ok(associations
            .iter()
            .filter_map(|association| {
                titles.get(&association.item_id).map(|title| Pairing {
                    item_id: association.item_id,
                    title: title.to_string(),
                    confidence: association.confidence,
                    lift: association.lift,
                    message: association.message.clone(),
                })
            })
            .take(limit)
            .collect())
    }

    /// Rank recommendations for a cart under the named strategy. Unknown
    /// strategies and malformed ids are rejected before computation; an
    /// empty candidate pool is a valid "no recommendations" outcome.
    pub async fn recommend(
        &self,
        cart: &[String],
        strategy: &str,
        limit: usize,
    ) -> Result<Vec<RecommendationCandidate>, ServiceError> {
        let strategy = Strategy::from_str(strategy)?;
        let cart: Vec<ItemId> =
            cart.iter().map(|raw| ItemId::parse(raw)).collect::<Result<_, _>>()?;

        let pool = self.items.list_active_items().await?;

        // A menu with no order history yet can still recommend from category
        // and popularity alone.
        let affinity = match self.affinity().await {
            Ok(map) => map,
            Err(ServiceError::Engine(EngineError::InsufficientData(_))) => {
                Arc::new(AffinityMap::default())
            }
            Err(error) => return Err(error),
        };

        match recommend(&cart, &pool, &affinity, strategy, limit) {
            Ok(ranked) => Ok(ranked),
            Err(EngineError::EmptyPool) => Ok(Vec::new()),
            Err(error) => Err(error.into()),
        }
    }

    /// Drop both result caches so the next read recomputes. This is the
    /// explicit manager-triggered refresh path; time-based expiry handles
    /// everything else.
    pub async fn invalidate_caches(&self) {
        self.affinity_cache.clear().await;
        self.pairing_cache.clear().await;
    }

    async fn affinity(&self) -> Result<Arc<AffinityMap>, ServiceError> {
        let orders = Arc::clone(&self.orders);
        let analyzer = self.analyzer.clone();

        self.affinity_cache
            .get_or_compute(AFFINITY_CACHE_KEY, self.config.affinity_ttl(), || async move {
                let history = orders.fulfilled_orders().await?;
                let map = analyzer.build(&history)?;
                tracing::debug!(
                    orders = history.len(),
                    pairs = map.len(),
                    "rebuilt co-purchase affinity structure"
                );
                Ok(Arc::new(map))
            })
            .await
    }
}

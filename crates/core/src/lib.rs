pub mod affinity;
pub mod cache;
pub mod classifier;
pub mod config;
pub mod domain;
pub mod errors;
pub mod recommend;
pub mod service;
pub mod stats;
pub mod store;

pub use affinity::{AffinityEntry, AffinityMap, AnalyzerConfig, Association, CoPurchaseAnalyzer};
pub use cache::TtlCache;
pub use classifier::{classify, suggested_actions, Classification};
pub use config::{AppConfig, ConfigError, EngineConfig, LoadOptions};
pub use domain::{Category, ItemId, MenuItemSnapshot, OrderId, OrderLine, OrderRecord, OrderStatus, SectionId};
pub use errors::{EngineError, ServiceError, StoreError};
pub use recommend::{recommend, Factor, RecommendationCandidate, Strategy};
pub use service::{
    BulkClassificationOutcome, CategoryBreakdown, ClassificationOutcome, ClassifiedItem,
    MenuIntelligence, MenuItemStats, Pairing,
};
pub use stats::{compute_stats, AggregateStats};
pub use store::{MenuItemStore, OrderStore};

//! Collaborator seams for the persistence layer.
//!
//! The engine never talks to storage directly: it reads item snapshots and
//! completed orders through these traits and writes classification results
//! back one item at a time, so a batch can succeed partially.

use async_trait::async_trait;

use crate::domain::{Category, ItemId, MenuItemSnapshot, OrderRecord};
use crate::errors::StoreError;

#[async_trait]
pub trait MenuItemStore: Send + Sync {
    /// Every active item, in a stable order.
    async fn list_active_items(&self) -> Result<Vec<MenuItemSnapshot>, StoreError>;

    async fn find_item(&self, id: &ItemId) -> Result<Option<MenuItemSnapshot>, StoreError>;

    /// Persist one classification result. Committed independently of any
    /// other item in the same run.
    async fn update_classification(
        &self,
        id: &ItemId,
        category: Category,
        confidence: f64,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All fulfilled (completed/delivered/ready) orders. Pending and
    /// cancelled orders never reach the analyzer.
    async fn fulfilled_orders(&self) -> Result<Vec<OrderRecord>, StoreError>;
}

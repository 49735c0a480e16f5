use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use menuwise_core::domain::{Category, ItemId, MenuItemSnapshot, OrderRecord, OrderStatus};
use menuwise_core::errors::StoreError;
use menuwise_core::store::{MenuItemStore, OrderStore};

/// In-memory implementation of the persistence seams, used by tests and
/// demo paths. Listing is title-ordered to match the SQL store.
#[derive(Default)]
pub struct InMemoryMenuStore {
    items: RwLock<HashMap<ItemId, MenuItemSnapshot>>,
    orders: RwLock<Vec<(OrderStatus, OrderRecord)>>,
}

impl InMemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_item(&self, item: MenuItemSnapshot) {
        let mut items = self.items.write().await;
        items.insert(item.id, item);
    }

    pub async fn insert_order(&self, status: OrderStatus, order: OrderRecord) {
        let mut orders = self.orders.write().await;
        orders.push((status, order));
    }
}

#[async_trait]
impl MenuItemStore for InMemoryMenuStore {
    async fn list_active_items(&self) -> Result<Vec<MenuItemSnapshot>, StoreError> {
        let items = self.items.read().await;
        let mut active: Vec<MenuItemSnapshot> =
            items.values().filter(|item| item.active).cloned().collect();
        active.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.id.cmp(&b.id)));
        Ok(active)
    }

    async fn find_item(&self, id: &ItemId) -> Result<Option<MenuItemSnapshot>, StoreError> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn update_classification(
        &self,
        id: &ItemId,
        category: Category,
        confidence: f64,
    ) -> Result<(), StoreError> {
        let mut items = self.items.write().await;
        let item = items
            .get_mut(id)
            .ok_or_else(|| StoreError::Backend(format!("menu item {id} not found")))?;
        item.category = category;
        item.confidence = Some(confidence);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for InMemoryMenuStore {
    async fn fulfilled_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|(status, _)| status.is_fulfilled())
            .map(|(_, order)| order.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use menuwise_core::domain::{
        Category, ItemId, MenuItemSnapshot, OrderId, OrderLine, OrderRecord, OrderStatus,
    };
    use menuwise_core::errors::StoreError;
    use menuwise_core::store::{MenuItemStore, OrderStore};

    use super::InMemoryMenuStore;

    fn id(n: u128) -> ItemId {
        ItemId(Uuid::from_u128(n))
    }

    fn item(n: u128, title: &str, active: bool) -> MenuItemSnapshot {
        MenuItemSnapshot {
            id: id(n),
            title: title.to_string(),
            section_id: None,
            price: Decimal::new(1000, 2),
            cost: Some(Decimal::new(400, 2)),
            total_purchases: 10,
            total_revenue: Decimal::new(10000, 2),
            total_profit: Decimal::new(6000, 2),
            category: Category::Unclassified,
            confidence: None,
            active,
        }
    }

    fn order(n: u128, items: &[ItemId]) -> OrderRecord {
        OrderRecord {
            id: OrderId(Uuid::from_u128(n)),
            ordered_at: Utc::now(),
            lines: items.iter().map(|&item_id| OrderLine { item_id, quantity: 1 }).collect(),
        }
    }

    #[tokio::test]
    async fn listing_returns_only_active_items_in_title_order() {
        let store = InMemoryMenuStore::new();
        store.insert_item(item(1, "Zucchini Chips", true)).await;
        store.insert_item(item(2, "Apple Crumble", true)).await;
        store.insert_item(item(3, "Retired Special", false)).await;

        let active = store.list_active_items().await.expect("list");
        let titles: Vec<&str> = active.iter().map(|item| item.title.as_str()).collect();
        assert_eq!(titles, vec!["Apple Crumble", "Zucchini Chips"]);
    }

    #[tokio::test]
    async fn classification_round_trips() {
        let store = InMemoryMenuStore::new();
        store.insert_item(item(1, "Duck Confit", true)).await;

        store
            .update_classification(&id(1), Category::Puzzle, 0.8)
            .await
            .expect("update");

        let found = store.find_item(&id(1)).await.expect("find").expect("present");
        assert_eq!(found.category, Category::Puzzle);
        assert_eq!(found.confidence, Some(0.8));
    }

    #[tokio::test]
    async fn updating_an_unknown_item_is_a_backend_error() {
        let store = InMemoryMenuStore::new();

        let error = store
            .update_classification(&id(9), Category::Star, 0.5)
            .await
            .expect_err("missing item");
        assert!(matches!(error, StoreError::Backend(_)));
    }

    #[tokio::test]
    async fn only_fulfilled_orders_are_returned() {
        let store = InMemoryMenuStore::new();
        store.insert_order(OrderStatus::Completed, order(1, &[id(1), id(2)])).await;
        store.insert_order(OrderStatus::Pending, order(2, &[id(1)])).await;
        store.insert_order(OrderStatus::Cancelled, order(3, &[id(2)])).await;
        store.insert_order(OrderStatus::Ready, order(4, &[id(1), id(3)])).await;

        let fulfilled = store.fulfilled_orders().await.expect("orders");
        assert_eq!(fulfilled.len(), 2);
    }
}

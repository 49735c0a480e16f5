//! The SQL store and the in-memory store must be interchangeable behind the
//! core seams, and the full engine must run end-to-end against sqlite.

use std::collections::HashMap;
use std::sync::Arc;

use menuwise_core::domain::Category;
use menuwise_core::service::MenuIntelligence;
use menuwise_core::store::{MenuItemStore, OrderStore};
use menuwise_db::{connect_with_settings, migrations, DemoDataset, InMemoryMenuStore, SqlMenuStore};

async fn seeded_sql_store() -> SqlMenuStore {
    // One pooled connection keeps the in-memory database alive and shared.
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");
    DemoDataset::build().load(&pool).await.expect("seed");
    SqlMenuStore::new(pool)
}

#[tokio::test]
async fn sql_and_memory_stores_agree_on_fixture_data() {
    let sql = seeded_sql_store().await;

    let memory = InMemoryMenuStore::new();
    DemoDataset::build().load_into_memory(&memory).await;

    let sql_items = sql.list_active_items().await.expect("sql items");
    let memory_items = memory.list_active_items().await.expect("memory items");
    assert_eq!(sql_items, memory_items);

    let sql_orders = sql.fulfilled_orders().await.expect("sql orders");
    let memory_orders = memory.fulfilled_orders().await.expect("memory orders");
    assert_eq!(sql_orders.len(), memory_orders.len());

    let sql_ids: Vec<_> = sql_orders.iter().map(|order| order.id).collect();
    let memory_ids: Vec<_> = memory_orders.iter().map(|order| order.id).collect();
    assert_eq!(sql_ids, memory_ids);

    for (sql_order, memory_order) in sql_orders.iter().zip(&memory_orders) {
        assert_eq!(sql_order.unique_items(), memory_order.unique_items());
    }
}

#[tokio::test]
async fn classification_runs_end_to_end_against_sqlite() {
    let store = Arc::new(seeded_sql_store().await);
    let service = MenuIntelligence::new(store.clone(), store.clone());

    let outcome = service.classify_all().await.expect("bulk classify");
    assert!(outcome.failed.is_empty());

    let by_title: HashMap<&str, Category> =
        outcome.classified.iter().map(|item| (item.title.as_str(), item.category)).collect();

    assert_eq!(by_title["Truffle Fries"], Category::Star);
    assert_eq!(by_title["House Lemonade"], Category::Star);
    assert_eq!(by_title["Chocolate Fondant"], Category::Star);
    assert_eq!(by_title["Classic Burger"], Category::Plowhorse);
    assert_eq!(by_title["Rib-eye Steak"], Category::Plowhorse);
    assert_eq!(by_title["Duck Confit"], Category::Puzzle);
    assert_eq!(by_title["Garden Salad"], Category::Dog);
    assert_eq!(by_title["Calamari"], Category::Dog);
    // Uncosted item classifies on the best-case margin assumption.
    assert_eq!(by_title["Seasonal Special"], Category::Puzzle);

    // Labels were written back to the database.
    let dataset = DemoDataset::build();
    let fries_id = dataset.find_item_id("Truffle Fries").expect("fixture id");
    let persisted =
        store.find_item(&fries_id).await.expect("find").expect("fries should be present");
    assert_eq!(persisted.category, Category::Star);
    assert!(persisted.confidence.is_some());
}

#[tokio::test]
async fn pairings_and_recommendations_run_against_sqlite() {
    let store = Arc::new(seeded_sql_store().await);
    let service = MenuIntelligence::new(store.clone(), store);
    service.classify_all().await.expect("classify");

    let dataset = DemoDataset::build();
    let burger = dataset.find_item_id("Classic Burger").expect("fixture id");

    let pairings =
        service.frequently_bought_with(&burger.to_string(), 5).await.expect("pairings");
    let partner_titles: Vec<&str> =
        pairings.iter().map(|pairing| pairing.title.as_str()).collect();
    // Equal confidence (10/16 each); lemonade wins on lift because fries are
    // in half of all orders.
    assert_eq!(partner_titles, vec!["House Lemonade", "Truffle Fries"]);
    for pairing in &pairings {
        assert!(pairing.confidence > 0.0 && pairing.confidence <= 1.0);
        assert!(pairing.lift > 0.0);
    }

    let ranked =
        service.recommend(&[burger.to_string()], "balanced", 5).await.expect("recommend");
    assert!(!ranked.is_empty());
    assert!(ranked.iter().all(|candidate| candidate.item_id != burger));
}

#[tokio::test]
async fn seeding_twice_is_idempotent() {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
    migrations::run_pending(&pool).await.expect("migrate");

    let dataset = DemoDataset::build();
    let first = dataset.load(&pool).await.expect("first seed");
    let second = dataset.load(&pool).await.expect("second seed");
    assert_eq!(first.items, second.items);

    let store = SqlMenuStore::new(pool);
    let items = store.list_active_items().await.expect("items");
    assert_eq!(items.len(), first.items);

    let orders = store.fulfilled_orders().await.expect("orders");
    let dataset_fulfilled =
        dataset.orders.iter().filter(|(status, _)| status.is_fulfilled()).count();
    assert_eq!(orders.len(), dataset_fulfilled);
}

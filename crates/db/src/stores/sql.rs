use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use menuwise_core::domain::{
    Category, ItemId, MenuItemSnapshot, OrderId, OrderLine, OrderRecord, SectionId,
};
use menuwise_core::errors::StoreError;
use menuwise_core::store::{MenuItemStore, OrderStore};

use super::backend;
use crate::DbPool;

const ITEM_COLUMNS: &str = "id, title, section_id, price, cost, total_purchases, \
     total_revenue, total_profit, category, confidence, is_active";

pub struct SqlMenuStore {
    pool: DbPool,
}

impl SqlMenuStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuItemStore for SqlMenuStore {
    async fn list_active_items(&self) -> Result<Vec<MenuItemSnapshot>, StoreError> {
        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM menu_item WHERE is_active = 1 ORDER BY title, id"
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await.map_err(backend)?;

        rows.iter().map(decode_item).collect()
    }

    async fn find_item(&self, id: &ItemId) -> Result<Option<MenuItemSnapshot>, StoreError> {
        let query = format!("SELECT {ITEM_COLUMNS} FROM menu_item WHERE id = ?1");
        let row = sqlx::query(&query)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        row.as_ref().map(decode_item).transpose()
    }

    async fn update_classification(
        &self,
        id: &ItemId,
        category: Category,
        confidence: f64,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE menu_item SET category = ?1, confidence = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(category.as_str())
        .bind(confidence)
        .bind(Utc::now().to_rfc3339())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!("menu item {id} not found")));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderStore for SqlMenuStore {
    async fn fulfilled_orders(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT o.id AS order_id, o.ordered_at, oi.item_id, oi.quantity
             FROM menu_order o
             JOIN menu_order_item oi ON oi.order_id = o.id
             WHERE o.status IN ('completed', 'delivered', 'ready')
             ORDER BY o.ordered_at, o.id, oi.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        let mut orders: Vec<OrderRecord> = Vec::new();
        let mut index_by_id: HashMap<OrderId, usize> = HashMap::new();

        for row in rows {
            let order_id = OrderId(parse_uuid(&get_text(&row, "order_id")?)?);
            let line = OrderLine {
                item_id: ItemId(parse_uuid(&get_text(&row, "item_id")?)?),
                quantity: parse_quantity(row.try_get::<i64, _>("quantity").map_err(backend)?)?,
            };

            match index_by_id.get(&order_id) {
                Some(&index) => orders[index].lines.push(line),
                None => {
                    index_by_id.insert(order_id, orders.len());
                    orders.push(OrderRecord {
                        id: order_id,
                        ordered_at: parse_timestamp(&get_text(&row, "ordered_at")?)?,
                        lines: vec![line],
                    });
                }
            }
        }

        Ok(orders)
    }
}

fn decode_item(row: &SqliteRow) -> Result<MenuItemSnapshot, StoreError> {
    let section_id = row
        .try_get::<Option<String>, _>("section_id")
        .map_err(backend)?
        .map(|raw| parse_uuid(&raw).map(SectionId))
        .transpose()?;
    let cost = row
        .try_get::<Option<String>, _>("cost")
        .map_err(backend)?
        .map(|raw| parse_money(&raw))
        .transpose()?;

    Ok(MenuItemSnapshot {
        id: ItemId(parse_uuid(&get_text(row, "id")?)?),
        title: get_text(row, "title")?,
        section_id,
        price: parse_money(&get_text(row, "price")?)?,
        cost,
        total_purchases: parse_count(row.try_get::<i64, _>("total_purchases").map_err(backend)?)?,
        total_revenue: parse_money(&get_text(row, "total_revenue")?)?,
        total_profit: parse_money(&get_text(row, "total_profit")?)?,
        category: get_text(row, "category")?
            .parse::<Category>()
            .map_err(|error| StoreError::Decode(error.to_string()))?,
        confidence: row.try_get::<Option<f64>, _>("confidence").map_err(backend)?,
        active: row.try_get::<i64, _>("is_active").map_err(backend)? != 0,
    })
}

fn get_text(row: &SqliteRow, column: &str) -> Result<String, StoreError> {
    row.try_get::<String, _>(column).map_err(backend)
}

fn parse_uuid(raw: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(raw).map_err(|_| StoreError::Decode(format!("invalid uuid `{raw}`")))
}

fn parse_money(raw: &str) -> Result<Decimal, StoreError> {
    Decimal::from_str_exact(raw)
        .map_err(|_| StoreError::Decode(format!("invalid decimal amount `{raw}`")))
}

fn parse_count(raw: i64) -> Result<u64, StoreError> {
    u64::try_from(raw).map_err(|_| StoreError::Decode(format!("negative count `{raw}`")))
}

fn parse_quantity(raw: i64) -> Result<u32, StoreError> {
    u32::try_from(raw).map_err(|_| StoreError::Decode(format!("invalid quantity `{raw}`")))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| StoreError::Decode(format!("invalid timestamp `{raw}`")))
}

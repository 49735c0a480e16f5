use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::item::ItemId;
use crate::errors::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub Uuid);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Completed,
    Delivered,
    Ready,
    Cancelled,
}

impl OrderStatus {
    /// Only fulfilled orders count as completed transactions for the
    /// co-purchase analyzer; pending and cancelled orders are excluded.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered | OrderStatus::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Ready => "ready",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "delivered" => Ok(OrderStatus::Delivered),
            "ready" => Ok(OrderStatus::Ready),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(EngineError::Validation(format!("unknown order status `{other}`"))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ItemId,
    pub quantity: u32,
}

/// A completed transaction: a multiset of item ids with quantities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: OrderId,
    pub ordered_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl OrderRecord {
    /// The distinct items in this order. Quantity does not matter for
    /// co-occurrence counting; an order with two burgers and one shake
    /// contributes one burger/shake pair in each direction.
    pub fn unique_items(&self) -> BTreeSet<ItemId> {
        self.lines.iter().map(|line| line.item_id).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::{OrderId, OrderLine, OrderRecord, OrderStatus};
    use crate::domain::item::ItemId;

    #[test]
    fn fulfilled_statuses_match_completed_transactions() {
        assert!(OrderStatus::Completed.is_fulfilled());
        assert!(OrderStatus::Delivered.is_fulfilled());
        assert!(OrderStatus::Ready.is_fulfilled());
        assert!(!OrderStatus::Pending.is_fulfilled());
        assert!(!OrderStatus::Cancelled.is_fulfilled());
    }

    #[test]
    fn unique_items_collapses_duplicate_lines() {
        let burger = ItemId(Uuid::from_u128(1));
        let shake = ItemId(Uuid::from_u128(2));
        let order = OrderRecord {
            id: OrderId(Uuid::from_u128(10)),
            ordered_at: Utc::now(),
            lines: vec![
                OrderLine { item_id: burger, quantity: 2 },
                OrderLine { item_id: burger, quantity: 1 },
                OrderLine { item_id: shake, quantity: 1 },
            ],
        };

        let unique = order.unique_items();
        assert_eq!(unique.len(), 2);
        assert!(unique.contains(&burger));
        assert!(unique.contains(&shake));
    }
}

//! In-memory OrderStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Order, OrderStatus};
use crate::interfaces::{OrderStore, Result, StorageError};

#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<String, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    orders
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StorageError::Conflict(format!("order {} exists", order.id)));
        }
        orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Order>> {
        Ok(newest_first(
            self.orders.read().await.values().cloned().collect(),
        ))
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        Ok(newest_first(
            self.orders
                .read()
                .await
                .values()
                .filter(|o| o.user_id == user_id)
                .cloned()
                .collect(),
        ))
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(existing) => {
                *existing = order.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("order", &order.id)),
        }
    }

    async fn update_if_status(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(existing) if existing.status == expected => {
                *existing = order.clone();
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Err(StorageError::not_found("order", &order.id)),
        }
    }
}

//! In-memory ProductStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Product;
use crate::interfaces::{ProductStore, Result, StorageError};

#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        if products.contains_key(&product.id) {
            return Err(StorageError::Conflict(format!("product {} exists", product.id)));
        }
        products.insert(product.id, product.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn update(&self, product: &Product) -> Result<()> {
        let mut products = self.products.write().await;
        let existing = products
            .get_mut(&product.id)
            .ok_or_else(|| StorageError::not_found("product", product.id))?;
        let stock = existing.stock;
        *existing = product.clone();
        existing.stock = stock;
        Ok(())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<i64> {
        let mut products = self.products.write().await;
        let product = products
            .get_mut(&id)
            .ok_or_else(|| StorageError::not_found("product", id))?;
        let next = match product.stock.checked_add(delta) {
            Some(next) if next >= 0 => next,
            _ => {
                return Err(StorageError::Conflict(format!(
                    "cannot adjust stock of product {} by {}",
                    id, delta
                )))
            }
        };
        product.stock = next;
        product.updated_at = Utc::now();
        Ok(next)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

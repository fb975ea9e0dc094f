//! Product storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;
use crate::domain::Product;

/// Interface for catalog persistence.
///
/// Implementations:
/// - `SqliteProductStore`: SQLite storage
/// - `MemoryProductStore`: in-process storage
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<Product>>;

    /// All products, newest first.
    async fn list(&self) -> Result<Vec<Product>>;

    /// Overwrite every field except stock. Fails with `NotFound` if absent.
    async fn update(&self, product: &Product) -> Result<()>;

    /// Atomically add `delta` to the stock count and return the new count.
    ///
    /// Fails with `Conflict` if the result would be negative, leaving stock
    /// unchanged.
    async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<i64>;

    /// Returns whether a product was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

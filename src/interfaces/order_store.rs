//! Order storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;
use crate::domain::{Order, OrderStatus};

#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fails with `Conflict` if the order id is taken.
    async fn insert(&self, order: &Order) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Order>>;

    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>>;

    /// Orders placed by one user, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;

    /// Fails with `NotFound` if absent.
    async fn update(&self, order: &Order) -> Result<()>;

    /// Write `order` only if the stored copy still has status `expected`.
    /// Returns `false` when the stored status has moved on. Fails with
    /// `NotFound` if absent.
    async fn update_if_status(&self, order: &Order, expected: OrderStatus) -> Result<bool>;
}

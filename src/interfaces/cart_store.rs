//! Cart storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;
use crate::domain::Cart;

/// One cart per user, replaced wholesale on every write.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<Cart>>;

    async fn put(&self, cart: &Cart) -> Result<()>;

    async fn delete(&self, user_id: Uuid) -> Result<()>;
}

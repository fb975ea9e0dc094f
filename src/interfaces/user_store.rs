//! User storage interface.

use async_trait::async_trait;
use uuid::Uuid;

use super::Result;
use crate::domain::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` if the email is taken.
    async fn insert(&self, user: &User) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<User>>;

    /// Lookup by (already lowercased) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// All users, oldest first.
    async fn list(&self) -> Result<Vec<User>>;

    /// Fails with `NotFound` if absent.
    async fn update(&self, user: &User) -> Result<()>;

    /// Returns whether a user was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

//! Customer accounts and their back-office management.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::errmsg;
use super::error::{Result, ServiceError};
use super::validation::{require_email, require_text};
use crate::domain::{NewUser, User, UserPatch, UserRole, UserStatus};
use crate::interfaces::{CartStore, UserStore};

/// Load a user that may change carts or place orders.
pub(crate) async fn load_active_user(users: &dyn UserStore, id: Uuid) -> Result<User> {
    let user = users
        .get(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("user", id))?;
    if !user.is_active() {
        return Err(ServiceError::Forbidden(errmsg::USER_SUSPENDED.to_string()));
    }
    Ok(user)
}

pub struct UserService {
    users: Arc<dyn UserStore>,
    carts: Arc<dyn CartStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, carts: Arc<dyn CartStore>) -> Self {
        Self { users, carts }
    }

    /// Register a customer. Emails are unique ignoring case and stored lowercase.
    pub async fn register(&self, input: NewUser) -> Result<User> {
        let email = input.email.trim().to_lowercase();
        require_email(&email, errmsg::EMAIL_INVALID)?;
        require_text(&input.display_name, errmsg::DISPLAY_NAME_REQUIRED)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict(errmsg::EMAIL_TAKEN.to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email,
            display_name: input.display_name.trim().to_string(),
            role: UserRole::Customer,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
        };
        self.users.insert(&user).await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.users
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    /// All users, oldest first, optionally narrowed by a case-insensitive
    /// match on email or display name.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<User>> {
        let users = self.users.list().await?;
        let needle = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => needle.to_lowercase(),
            None => return Ok(users),
        };

        Ok(users
            .into_iter()
            .filter(|u| {
                u.email.contains(&needle) || u.display_name.to_lowercase().contains(&needle)
            })
            .collect())
    }

    pub async fn update(&self, id: Uuid, patch: UserPatch) -> Result<User> {
        if let Some(name) = &patch.display_name {
            require_text(name, errmsg::DISPLAY_NAME_REQUIRED)?;
        }

        let mut user = self.get(id).await?;
        patch.apply(&mut user, Utc::now());
        self.users.update(&user).await?;

        info!(
            user_id = %id,
            role = %user.role,
            status = %user.status,
            "User updated"
        );
        Ok(user)
    }

    /// Delete a user along with their cart. Orders are kept.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if !self.users.delete(id).await? {
            return Err(ServiceError::not_found("user", id));
        }
        self.carts.delete(id).await?;

        info!(user_id = %id, "User deleted");
        Ok(())
    }
}

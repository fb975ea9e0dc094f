//! SQLite CartStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_time, parse_time};
use crate::domain::{Cart, CartItem};
use crate::interfaces::{CartStore, Result};
use crate::storage::schema::Carts;

/// SQLite implementation of CartStore.
pub struct SqliteCartStore {
    pool: SqlitePool,
}

impl SqliteCartStore {
    /// Create a new SQLite cart store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for SqliteCartStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<Cart>> {
        let (sql, values) = Query::select()
            .columns([Carts::Items, Carts::UpdatedAt])
            .from(Carts::Table)
            .and_where(Expr::col(Carts::UserId).eq(user_id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items: Vec<CartItem> =
                    serde_json::from_str(&row.try_get::<String, _>("items")?)?;
                Ok(Some(Cart {
                    user_id,
                    items,
                    updated_at: parse_time(&row.try_get::<String, _>("updated_at")?)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn put(&self, cart: &Cart) -> Result<()> {
        let items = serde_json::to_string(&cart.items)?;

        let (sql, values) = Query::insert()
            .into_table(Carts::Table)
            .columns([Carts::UserId, Carts::Items, Carts::UpdatedAt])
            .values_panic([
                cart.user_id.to_string().into(),
                items.into(),
                format_time(cart.updated_at).into(),
            ])
            .on_conflict(
                OnConflict::column(Carts::UserId)
                    .update_columns([Carts::Items, Carts::UpdatedAt])
                    .to_owned(),
            )
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(())
    }

    async fn delete(&self, user_id: Uuid) -> Result<()> {
        let (sql, values) = Query::delete()
            .from_table(Carts::Table)
            .and_where(Expr::col(Carts::UserId).eq(user_id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(())
    }
}

//! SQLite UserStore implementation.

use async_trait::async_trait;
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_time, map_unique_violation, parse_label, parse_time, parse_uuid};
use crate::domain::User;
use crate::interfaces::{Result, StorageError, UserStore};
use crate::storage::schema::Users;

const COLUMNS: [Users; 7] = [
    Users::Id,
    Users::Email,
    Users::DisplayName,
    Users::Role,
    Users::Status,
    Users::CreatedAt,
    Users::UpdatedAt,
];

/// SQLite implementation of UserStore.
pub struct SqliteUserStore {
    pool: SqlitePool,
}

impl SqliteUserStore {
    /// Create a new SQLite user store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> Result<User> {
        Ok(User {
            id: parse_uuid(&row.try_get::<String, _>("id")?)?,
            email: row.try_get("email")?,
            display_name: row.try_get("display_name")?,
            role: parse_label(&row.try_get::<String, _>("role")?)?,
            status: parse_label(&row.try_get::<String, _>("status")?)?,
            created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_time(&row.try_get::<String, _>("updated_at")?)?,
        })
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let (sql, values) = Query::insert()
            .into_table(Users::Table)
            .columns(COLUMNS)
            .values_panic([
                user.id.to_string().into(),
                user.email.clone().into(),
                user.display_name.clone().into(),
                user.role.as_str().into(),
                user.status.as_str().into(),
                format_time(user.created_at).into(),
                format_time(user.updated_at).into(),
            ])
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || format!("email {} is already registered", user.email)))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let (sql, values) = Query::select()
            .columns(COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let (sql, values) = Query::select()
            .columns(COLUMNS)
            .from(Users::Table)
            .and_where(Expr::col(Users::Email).eq(email))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<User>> {
        let (sql, values) = Query::select()
            .columns(COLUMNS)
            .from(Users::Table)
            .order_by(Users::CreatedAt, Order::Asc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(Self::from_row).collect()
    }

    async fn update(&self, user: &User) -> Result<()> {
        let (sql, values) = Query::update()
            .table(Users::Table)
            .values([
                (Users::DisplayName, user.display_name.clone().into()),
                (Users::Role, user.role.as_str().into()),
                (Users::Status, user.status.as_str().into()),
                (Users::UpdatedAt, format_time(user.updated_at).into()),
            ])
            .and_where(Expr::col(Users::Id).eq(user.id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("user", user.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let (sql, values) = Query::delete()
            .from_table(Users::Table)
            .and_where(Expr::col(Users::Id).eq(id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

//! SQLite ProductStore implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_time, parse_time, parse_uuid};
use crate::domain::Product;
use crate::interfaces::{ProductStore, Result, StorageError};
use crate::storage::schema::Products;

const COLUMNS: [Products; 10] = [
    Products::Id,
    Products::Name,
    Products::Description,
    Products::Category,
    Products::PriceCents,
    Products::Stock,
    Products::Published,
    Products::ImageUrl,
    Products::CreatedAt,
    Products::UpdatedAt,
];

/// SQLite implementation of ProductStore.
pub struct SqliteProductStore {
    pool: SqlitePool,
}

impl SqliteProductStore {
    /// Create a new SQLite product store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn from_row(row: &SqliteRow) -> Result<Product> {
        Ok(Product {
            id: parse_uuid(&row.try_get::<String, _>("id")?)?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            category: row.try_get("category")?,
            price_cents: row.try_get("price_cents")?,
            stock: row.try_get("stock")?,
            published: row.try_get("published")?,
            image_url: row.try_get("image_url")?,
            created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_time(&row.try_get::<String, _>("updated_at")?)?,
        })
    }
}

#[async_trait]
impl ProductStore for SqliteProductStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        let (sql, values) = Query::insert()
            .into_table(Products::Table)
            .columns(COLUMNS)
            .values_panic([
                product.id.to_string().into(),
                product.name.clone().into(),
                product.description.clone().into(),
                product.category.clone().into(),
                product.price_cents.into(),
                product.stock.into(),
                product.published.into(),
                product.image_url.clone().into(),
                format_time(product.created_at).into(),
                format_time(product.updated_at).into(),
            ])
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(&self.pool)
            .await
            .map_err(|e| super::map_unique_violation(e, || format!("product {} exists", product.id)))?;

        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        let (sql, values) = Query::select()
            .columns(COLUMNS)
            .from(Products::Table)
            .and_where(Expr::col(Products::Id).eq(id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let (sql, values) = Query::select()
            .columns(COLUMNS)
            .from(Products::Table)
            .order_by(Products::CreatedAt, Order::Desc)
            .build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;

        rows.iter().map(Self::from_row).collect()
    }

    async fn update(&self, product: &Product) -> Result<()> {
        let (sql, values) = Query::update()
            .table(Products::Table)
            .values([
                (Products::Name, product.name.clone().into()),
                (Products::Description, product.description.clone().into()),
                (Products::Category, product.category.clone().into()),
                (Products::PriceCents, product.price_cents.into()),
                (Products::Published, product.published.into()),
                (Products::ImageUrl, product.image_url.clone().into()),
                (Products::UpdatedAt, format_time(product.updated_at).into()),
            ])
            .and_where(Expr::col(Products::Id).eq(product.id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("product", product.id));
        }
        Ok(())
    }

    async fn adjust_stock(&self, id: Uuid, delta: i64) -> Result<i64> {
        let out_of_range = || {
            StorageError::Conflict(format!(
                "cannot adjust stock of product {} by {}",
                id, delta
            ))
        };
        let removed = delta.checked_neg().ok_or_else(out_of_range)?;

        // The guard and the increment run in one statement, so concurrent
        // checkouts cannot drive stock below zero. SQLite turns an integer
        // overflow into a REAL, so the upper bound is guarded as well.
        let mut update = Query::update();
        update
            .table(Products::Table)
            .value(Products::Stock, Expr::col(Products::Stock).add(delta))
            .value(Products::UpdatedAt, format_time(Utc::now()))
            .and_where(Expr::col(Products::Id).eq(id.to_string()))
            .and_where(Expr::col(Products::Stock).gte(removed));
        if delta > 0 {
            update.and_where(Expr::col(Products::Stock).lte(i64::MAX - delta));
        }
        let (sql, values) = update
            .returning_col(Products::Stock)
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get("stock")?),
            None if self.get(id).await?.is_some() => Err(out_of_range()),
            None => Err(StorageError::not_found("product", id)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let (sql, values) = Query::delete()
            .from_table(Products::Table)
            .and_where(Expr::col(Products::Id).eq(id.to_string()))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

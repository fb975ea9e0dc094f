//! SQLite implementations of storage interfaces.

mod cart_store;
mod order_store;
mod product_store;
mod user_store;

pub use cart_store::SqliteCartStore;
pub use order_store::SqliteOrderStore;
pub use product_store::SqliteProductStore;
pub use user_store::SqliteUserStore;

use chrono::{DateTime, SecondsFormat, Utc};
use sea_query::{ColumnDef, Index, SqliteQueryBuilder, Table};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::interfaces::{Result, StorageError};
use crate::storage::schema::{Carts, Orders, Products, Users};

/// Path value selecting a private in-memory database.
pub const IN_MEMORY_PATH: &str = ":memory:";

/// Open a connection pool for the database at `path`.
///
/// An in-memory database lives only as long as its connection, so it gets a
/// single connection that is never recycled.
pub async fn connect(path: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = if path == IN_MEMORY_PATH {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

/// Create all storefront tables and indexes if they do not exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    let create_products = Table::create()
        .table(Products::Table)
        .if_not_exists()
        .col(ColumnDef::new(Products::Id).text().not_null().primary_key())
        .col(ColumnDef::new(Products::Name).text().not_null())
        .col(ColumnDef::new(Products::Description).text().not_null())
        .col(ColumnDef::new(Products::Category).text().not_null())
        .col(ColumnDef::new(Products::PriceCents).big_integer().not_null())
        .col(ColumnDef::new(Products::Stock).big_integer().not_null())
        .col(ColumnDef::new(Products::Published).boolean().not_null())
        .col(ColumnDef::new(Products::ImageUrl).text().null())
        .col(ColumnDef::new(Products::CreatedAt).text().not_null())
        .col(ColumnDef::new(Products::UpdatedAt).text().not_null())
        .to_string(SqliteQueryBuilder);

    sqlx::query(&create_products).execute(pool).await?;

    let idx_category = Index::create()
        .if_not_exists()
        .name("idx_products_category")
        .table(Products::Table)
        .col(Products::Category)
        .to_string(SqliteQueryBuilder);

    sqlx::query(&idx_category).execute(pool).await?;

    let create_users = Table::create()
        .table(Users::Table)
        .if_not_exists()
        .col(ColumnDef::new(Users::Id).text().not_null().primary_key())
        .col(ColumnDef::new(Users::Email).text().not_null())
        .col(ColumnDef::new(Users::DisplayName).text().not_null())
        .col(ColumnDef::new(Users::Role).text().not_null())
        .col(ColumnDef::new(Users::Status).text().not_null())
        .col(ColumnDef::new(Users::CreatedAt).text().not_null())
        .col(ColumnDef::new(Users::UpdatedAt).text().not_null())
        .to_string(SqliteQueryBuilder);

    sqlx::query(&create_users).execute(pool).await?;

    // Unique index on email
    let idx_email = Index::create()
        .if_not_exists()
        .name("idx_users_email")
        .table(Users::Table)
        .col(Users::Email)
        .unique()
        .to_string(SqliteQueryBuilder);

    sqlx::query(&idx_email).execute(pool).await?;

    let create_orders = Table::create()
        .table(Orders::Table)
        .if_not_exists()
        .col(ColumnDef::new(Orders::Id).text().not_null().primary_key())
        .col(ColumnDef::new(Orders::UserId).text().not_null())
        .col(ColumnDef::new(Orders::ContactName).text().not_null())
        .col(ColumnDef::new(Orders::ContactEmail).text().not_null())
        .col(ColumnDef::new(Orders::ContactPhone).text().null())
        .col(ColumnDef::new(Orders::GameAccountId).text().not_null())
        .col(ColumnDef::new(Orders::Items).text().not_null())
        .col(ColumnDef::new(Orders::PaymentMethod).text().not_null())
        .col(ColumnDef::new(Orders::PaymentReference).text().null())
        .col(ColumnDef::new(Orders::CouponCode).text().null())
        .col(ColumnDef::new(Orders::SubtotalCents).big_integer().not_null())
        .col(ColumnDef::new(Orders::FeeCents).big_integer().not_null())
        .col(ColumnDef::new(Orders::DiscountCents).big_integer().not_null())
        .col(ColumnDef::new(Orders::TotalCents).big_integer().not_null())
        .col(ColumnDef::new(Orders::Status).text().not_null())
        .col(ColumnDef::new(Orders::RedeemCode).text().null())
        .col(ColumnDef::new(Orders::CreatedAt).text().not_null())
        .col(ColumnDef::new(Orders::UpdatedAt).text().not_null())
        .to_string(SqliteQueryBuilder);

    sqlx::query(&create_orders).execute(pool).await?;

    let idx_user = Index::create()
        .if_not_exists()
        .name("idx_orders_user")
        .table(Orders::Table)
        .col(Orders::UserId)
        .to_string(SqliteQueryBuilder);

    sqlx::query(&idx_user).execute(pool).await?;

    let idx_status = Index::create()
        .if_not_exists()
        .name("idx_orders_status")
        .table(Orders::Table)
        .col(Orders::Status)
        .to_string(SqliteQueryBuilder);

    sqlx::query(&idx_status).execute(pool).await?;

    let create_carts = Table::create()
        .table(Carts::Table)
        .if_not_exists()
        .col(ColumnDef::new(Carts::UserId).text().not_null().primary_key())
        .col(ColumnDef::new(Carts::Items).text().not_null())
        .col(ColumnDef::new(Carts::UpdatedAt).text().not_null())
        .to_string(SqliteQueryBuilder);

    sqlx::query(&create_carts).execute(pool).await?;

    Ok(())
}

/// Fixed-width RFC3339 so stored timestamps sort lexically.
pub(crate) fn format_time(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid> {
    Ok(Uuid::parse_str(value)?)
}

pub(crate) fn parse_label<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| StorageError::InvalidData(e.to_string()))
}

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: impl FnOnce() -> String) -> StorageError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict(message()),
        _ => StorageError::Database(err),
    }
}

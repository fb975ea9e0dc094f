//! SQLite OrderStore implementation.

use async_trait::async_trait;
use sea_query::{
    Expr, Order as SortOrder, Query, SelectStatement, SqliteQueryBuilder, UpdateStatement,
};
use sea_query_binder::SqlxBinder;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{format_time, map_unique_violation, parse_label, parse_time, parse_uuid};
use crate::domain::{ContactInfo, Order, OrderItem, OrderStatus};
use crate::interfaces::{OrderStore, Result, StorageError};
use crate::storage::schema::Orders;

const COLUMNS: [Orders; 18] = [
    Orders::Id,
    Orders::UserId,
    Orders::ContactName,
    Orders::ContactEmail,
    Orders::ContactPhone,
    Orders::GameAccountId,
    Orders::Items,
    Orders::PaymentMethod,
    Orders::PaymentReference,
    Orders::CouponCode,
    Orders::SubtotalCents,
    Orders::FeeCents,
    Orders::DiscountCents,
    Orders::TotalCents,
    Orders::Status,
    Orders::RedeemCode,
    Orders::CreatedAt,
    Orders::UpdatedAt,
];

/// SQLite implementation of OrderStore.
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Every mutable column, keyed on the order id.
    fn update_statement(order: &Order) -> Result<UpdateStatement> {
        let items = serde_json::to_string(&order.items)?;

        let mut update = Query::update();
        update
            .table(Orders::Table)
            .values([
                (Orders::ContactName, order.contact.name.clone().into()),
                (Orders::ContactEmail, order.contact.email.clone().into()),
                (Orders::ContactPhone, order.contact.phone.clone().into()),
                (Orders::GameAccountId, order.contact.game_account_id.clone().into()),
                (Orders::Items, items.into()),
                (Orders::PaymentMethod, order.payment_method.clone().into()),
                (Orders::PaymentReference, order.payment_reference.clone().into()),
                (Orders::CouponCode, order.coupon_code.clone().into()),
                (Orders::SubtotalCents, order.subtotal_cents.into()),
                (Orders::FeeCents, order.fee_cents.into()),
                (Orders::DiscountCents, order.discount_cents.into()),
                (Orders::TotalCents, order.total_cents.into()),
                (Orders::Status, order.status.as_str().into()),
                (Orders::RedeemCode, order.redeem_code.clone().into()),
                (Orders::UpdatedAt, format_time(order.updated_at).into()),
            ])
            .and_where(Expr::col(Orders::Id).eq(order.id.as_str()));
        Ok(update)
    }

    fn from_row(row: &SqliteRow) -> Result<Order> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.try_get::<String, _>("items")?)?;

        Ok(Order {
            id: row.try_get("id")?,
            user_id: parse_uuid(&row.try_get::<String, _>("user_id")?)?,
            contact: ContactInfo {
                name: row.try_get("contact_name")?,
                email: row.try_get("contact_email")?,
                phone: row.try_get("contact_phone")?,
                game_account_id: row.try_get("game_account_id")?,
            },
            items,
            payment_method: row.try_get("payment_method")?,
            payment_reference: row.try_get("payment_reference")?,
            coupon_code: row.try_get("coupon_code")?,
            subtotal_cents: row.try_get("subtotal_cents")?,
            fee_cents: row.try_get("fee_cents")?,
            discount_cents: row.try_get("discount_cents")?,
            total_cents: row.try_get("total_cents")?,
            status: parse_label(&row.try_get::<String, _>("status")?)?,
            redeem_code: row.try_get("redeem_code")?,
            created_at: parse_time(&row.try_get::<String, _>("created_at")?)?,
            updated_at: parse_time(&row.try_get::<String, _>("updated_at")?)?,
        })
    }

    async fn fetch_all(&self, query: &SelectStatement) -> Result<Vec<Order>> {
        let (sql, values) = query.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_with(&sql, values).fetch_all(&self.pool).await?;
        rows.iter().map(Self::from_row).collect()
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert(&self, order: &Order) -> Result<()> {
        let items = serde_json::to_string(&order.items)?;

        let (sql, values) = Query::insert()
            .into_table(Orders::Table)
            .columns(COLUMNS)
            .values_panic([
                order.id.clone().into(),
                order.user_id.to_string().into(),
                order.contact.name.clone().into(),
                order.contact.email.clone().into(),
                order.contact.phone.clone().into(),
                order.contact.game_account_id.clone().into(),
                items.into(),
                order.payment_method.clone().into(),
                order.payment_reference.clone().into(),
                order.coupon_code.clone().into(),
                order.subtotal_cents.into(),
                order.fee_cents.into(),
                order.discount_cents.into(),
                order.total_cents.into(),
                order.status.as_str().into(),
                order.redeem_code.clone().into(),
                format_time(order.created_at).into(),
                format_time(order.updated_at).into(),
            ])
            .build_sqlx(SqliteQueryBuilder);

        sqlx::query_with(&sql, values)
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, || format!("order {} exists", order.id)))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Order>> {
        let (sql, values) = Query::select()
            .columns(COLUMNS)
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);

        let row = sqlx::query_with(&sql, values)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let query = Query::select()
            .columns(COLUMNS)
            .from(Orders::Table)
            .order_by(Orders::CreatedAt, SortOrder::Desc)
            .to_owned();

        self.fetch_all(&query).await
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let query = Query::select()
            .columns(COLUMNS)
            .from(Orders::Table)
            .and_where(Expr::col(Orders::UserId).eq(user_id.to_string()))
            .order_by(Orders::CreatedAt, SortOrder::Desc)
            .to_owned();

        self.fetch_all(&query).await
    }

    async fn update(&self, order: &Order) -> Result<()> {
        let (sql, values) = Self::update_statement(order)?.build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("order", &order.id));
        }
        Ok(())
    }

    async fn update_if_status(&self, order: &Order, expected: OrderStatus) -> Result<bool> {
        let (sql, values) = Self::update_statement(order)?
            .and_where(Expr::col(Orders::Status).eq(expected.as_str()))
            .build_sqlx(SqliteQueryBuilder);

        let result = sqlx::query_with(&sql, values).execute(&self.pool).await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        match self.get(&order.id).await? {
            Some(_) => Ok(false),
            None => Err(StorageError::not_found("order", &order.id)),
        }
    }
}

//! Order tracking, customer cancellation and back-office fulfilment.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use super::errmsg;
use super::error::{Result, ServiceError};
use super::validation::require_text;
use crate::domain::{Order, OrderItem, OrderStatus};
use crate::interfaces::{OrderStore, ProductStore, UserStore};

/// Return order lines to stock.
///
/// Products deleted since the order was placed are skipped.
pub(crate) async fn restock(products: &dyn ProductStore, items: &[OrderItem]) {
    for item in items {
        if let Err(e) = products.adjust_stock(item.product_id, item.quantity).await {
            warn!(
                product_id = %item.product_id,
                quantity = item.quantity,
                error = %e,
                "Could not return stock"
            );
        }
    }
}

/// An order with its display label.
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: &'static str,
    pub item_count: i64,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            status_label: order.status.label(),
            item_count: order.item_count(),
            order,
        }
    }
}

/// Back-office order list filter.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match on order id, contact email or contact name.
    pub search: Option<String>,
}

impl OrderFilter {
    fn matches(&self, order: &Order, needle: Option<&str>) -> bool {
        if self.status.is_some_and(|status| order.status != status) {
            return false;
        }
        match needle {
            Some(needle) => [&order.id, &order.contact.email, &order.contact.name]
                .iter()
                .any(|field| field.to_lowercase().contains(needle)),
            None => true,
        }
    }
}

pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    products: Arc<dyn ProductStore>,
    users: Arc<dyn UserStore>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            orders,
            products,
            users,
        }
    }

    async fn load(&self, order_id: &str) -> Result<Order> {
        self.orders
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("order", order_id))
    }

    pub async fn get(&self, order_id: &str) -> Result<OrderView> {
        Ok(self.load(order_id).await?.into())
    }

    /// Guest lookup. A wrong email looks exactly like a missing order.
    pub async fn track(&self, order_id: &str, email: &str) -> Result<OrderView> {
        match self.orders.get(order_id.trim()).await? {
            Some(order) if order.contact.email.eq_ignore_ascii_case(email.trim()) => {
                Ok(order.into())
            }
            _ => Err(ServiceError::not_found("order", order_id)),
        }
    }

    /// A user's orders, newest first.
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<OrderView>> {
        if self.users.get(user_id).await?.is_none() {
            return Err(ServiceError::not_found("user", user_id));
        }
        let orders = self.orders.list_for_user(user_id).await?;
        Ok(orders.into_iter().map(OrderView::from).collect())
    }

    /// Customer cancellation of their own pending or paid order.
    pub async fn cancel(&self, user_id: Uuid, order_id: &str) -> Result<OrderView> {
        let order = self.load(order_id).await?;
        if order.user_id != user_id {
            return Err(ServiceError::not_found("order", order_id));
        }
        if !matches!(order.status, OrderStatus::Pending | OrderStatus::Paid) {
            return Err(ServiceError::Conflict(errmsg::ORDER_NOT_CANCELLABLE.to_string()));
        }
        self.apply_status(order, OrderStatus::Cancelled).await
    }

    /// Back-office order list, newest first.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<OrderView>> {
        let needle = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        Ok(self
            .orders
            .list()
            .await?
            .into_iter()
            .filter(|o| filter.matches(o, needle.as_deref()))
            .map(OrderView::from)
            .collect())
    }

    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<OrderView> {
        let order = self.load(order_id).await?;
        self.apply_status(order, status).await
    }

    /// Deliver the redeem code. The order becomes completed.
    pub async fn set_redeem_code(&self, order_id: &str, code: &str) -> Result<OrderView> {
        require_text(code, errmsg::REDEEM_CODE_REQUIRED)?;

        let mut order = self.load(order_id).await?;
        if !order.status.counts_as_revenue() {
            return Err(ServiceError::Conflict(errmsg::ORDER_NOT_PAID.to_string()));
        }

        let now = Utc::now();
        let previous = order.status;
        if previous != OrderStatus::Completed {
            order.transition(OrderStatus::Completed, now)?;
        }
        order.redeem_code = Some(code.trim().to_string());
        order.updated_at = now;
        self.store_if_unchanged(&order, previous).await?;

        info!(order_id = %order.id, "Redeem code delivered");
        Ok(order.into())
    }

    /// Concurrent requests on one order race here; only the first write
    /// lands, so side effects such as restocking run once.
    async fn store_if_unchanged(&self, order: &Order, previous: OrderStatus) -> Result<()> {
        if !self.orders.update_if_status(order, previous).await? {
            return Err(ServiceError::Conflict(errmsg::ORDER_CHANGED.to_string()));
        }
        Ok(())
    }

    async fn apply_status(&self, mut order: Order, status: OrderStatus) -> Result<OrderView> {
        let previous = order.status;
        order.transition(status, Utc::now())?;
        self.store_if_unchanged(&order, previous).await?;

        if status == OrderStatus::Cancelled {
            restock(self.products.as_ref(), &order.items).await;
        }

        info!(
            order_id = %order.id,
            from = %previous,
            to = %status,
            "Order status changed"
        );
        Ok(order.into())
    }
}

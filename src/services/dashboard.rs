//! Back-office dashboard summary.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::Result;
use super::orders::OrderView;
use crate::domain::{OrderStatus, ProductStatus, UserRole, UserStatus};
use crate::storage::Stores;

/// How many orders the dashboard lists.
pub const RECENT_ORDER_COUNT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserCounts {
    pub total: usize,
    pub admins: usize,
    pub suspended: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    /// Sum of order totals for paid, processing and completed orders.
    pub revenue_cents: i64,
    pub orders_by_status: BTreeMap<&'static str, usize>,
    pub products_by_status: BTreeMap<&'static str, usize>,
    pub users: UserCounts,
    pub recent_orders: Vec<OrderView>,
}

pub struct DashboardService {
    stores: Stores,
    low_stock_threshold: i64,
}

impl DashboardService {
    pub fn new(stores: Stores, low_stock_threshold: i64) -> Self {
        Self {
            stores,
            low_stock_threshold,
        }
    }

    pub async fn summary(&self) -> Result<DashboardSummary> {
        let orders = self.stores.orders.list().await?;
        let products = self.stores.products.list().await?;
        let users = self.stores.users.list().await?;

        let revenue_cents = orders
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .fold(0i64, |acc, o| acc.saturating_add(o.total_cents));

        // Every status is reported, including zero counts.
        let mut orders_by_status: BTreeMap<&'static str, usize> =
            OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for order in &orders {
            *orders_by_status.entry(order.status.as_str()).or_default() += 1;
        }

        let mut products_by_status: BTreeMap<&'static str, usize> =
            ProductStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        for product in &products {
            let status = product.status(self.low_stock_threshold);
            *products_by_status.entry(status.as_str()).or_default() += 1;
        }

        let user_counts = UserCounts {
            total: users.len(),
            admins: users.iter().filter(|u| u.role == UserRole::Admin).count(),
            suspended: users
                .iter()
                .filter(|u| u.status == UserStatus::Suspended)
                .count(),
        };

        let recent_orders = orders
            .into_iter()
            .take(RECENT_ORDER_COUNT)
            .map(OrderView::from)
            .collect();

        Ok(DashboardSummary {
            revenue_cents,
            orders_by_status,
            products_by_status,
            users: user_counts,
            recent_orders,
        })
    }
}

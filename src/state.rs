//! Shared application state handed to every HTTP handler.

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    CartService, CatalogService, CheckoutService, DashboardService, OrderService, PaymentGateway,
    SimulatedGateway, UserService,
};
use crate::storage::Stores;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogService>,
    pub carts: Arc<CartService>,
    pub checkout: Arc<CheckoutService>,
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
    pub dashboard: Arc<DashboardService>,
    /// Bearer token for `/api/admin`. Empty disables the admin API.
    pub admin_token: Arc<str>,
}

impl AppState {
    /// Wire services over `stores`, charging through the simulated gateway.
    pub fn from_config(config: &Config, stores: Stores) -> Self {
        let gateway = Arc::new(SimulatedGateway::new(config.checkout.payment_delay()));
        Self::new(config, stores, gateway)
    }

    pub fn new(config: &Config, stores: Stores, gateway: Arc<dyn PaymentGateway>) -> Self {
        let threshold = config.catalog.low_stock_threshold;
        Self {
            catalog: Arc::new(CatalogService::new(stores.products.clone(), threshold)),
            carts: Arc::new(CartService::new(
                stores.carts.clone(),
                stores.products.clone(),
                stores.users.clone(),
            )),
            checkout: Arc::new(CheckoutService::new(&stores, &config.checkout, gateway)),
            orders: Arc::new(OrderService::new(
                stores.orders.clone(),
                stores.products.clone(),
                stores.users.clone(),
            )),
            users: Arc::new(UserService::new(stores.users.clone(), stores.carts.clone())),
            dashboard: Arc::new(DashboardService::new(stores, threshold)),
            admin_token: Arc::from(config.admin.api_token.as_str()),
        }
    }
}

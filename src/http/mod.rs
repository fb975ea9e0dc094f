//! HTTP API.
//!
//! Storefront endpoints live under `/api`, back-office endpoints under
//! `/api/admin` behind a bearer token:
//! - `GET /api/health` health check
//! - catalog, user, cart, checkout and order routes for customers
//! - dashboard, product, user and order management for staff

pub mod auth;
pub mod error;
pub mod handlers;

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, patch, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::state::AppState;
use crate::utils::bootstrap::shutdown_signal;
use handlers::{admin, cart, catalog, checkout, orders, users};

pub use error::{ApiError, ApiResult};

/// Bind `addr` and serve until Ctrl+C.
///
/// When the port is 0, the OS assigns an ephemeral port. The actual bound
/// address is always logged so it can be discovered.
pub async fn serve(
    state: AppState,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(address = %local, "Coinfront API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Coinfront API stopped");
    Ok(())
}

/// Build the axum router (separated for testing).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/api/health", get(handlers::health))
        .merge(storefront_routes())
        .nest("/api/admin", admin_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn storefront_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(catalog::list_products))
        .route("/api/products/:id", get(catalog::get_product))
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/payment-methods", get(checkout::payment_methods))
        .route("/api/users", post(users::register))
        .route("/api/users/:id", get(users::get_user))
        .route("/api/users/:id/cart", get(cart::view).delete(cart::clear))
        .route("/api/users/:id/cart/items", post(cart::add_item))
        .route(
            "/api/users/:id/cart/items/:product_id",
            put(cart::update_item).delete(cart::remove_item),
        )
        .route("/api/users/:id/checkout/quote", post(checkout::quote))
        .route("/api/users/:id/checkout", post(checkout::place_order))
        .route("/api/users/:id/orders", get(orders::list_for_user))
        .route(
            "/api/users/:id/orders/:order_id/cancel",
            post(orders::cancel),
        )
        .route("/api/orders/:order_id/track", get(orders::track))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/:id",
            get(admin::get_product)
                .patch(admin::update_product)
                .delete(admin::delete_product),
        )
        .route("/products/:id/stock", post(admin::adjust_stock))
        .route("/users", get(admin::list_users))
        .route(
            "/users/:id",
            patch(admin::update_user).delete(admin::delete_user),
        )
        .route("/orders", get(admin::list_orders))
        .route("/orders/:order_id", get(admin::get_order))
        .route("/orders/:order_id/status", put(admin::update_order_status))
        .route("/orders/:order_id/redeem-code", put(admin::set_redeem_code))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin))
}

//! coinfront: storefront and back-office HTTP server.
//!
//! ## Configuration
//! - `config.yaml` in the working directory, `--config <path>`, or the
//!   file named by COINFRONT_CONFIG
//! - COINFRONT__SECTION__KEY environment overrides (e.g. COINFRONT__SERVER__PORT)
//! - COINFRONT_LOG: tracing filter (default: info)

use tracing::{error, info};

use coinfront::config::Config;
use coinfront::state::AppState;
use coinfront::storage::init_storage;
use coinfront::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if !config.admin.is_enabled() {
        info!("No admin token configured, back-office API is disabled");
    }

    let stores = init_storage(&config.storage).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        e
    })?;

    let state = AppState::from_config(&config, stores);

    info!(
        storage = %config.storage.storage_type,
        payment_delay_ms = config.checkout.payment_delay_ms,
        payment_methods = config.checkout.payment_methods.len(),
        "Starting coinfront"
    );

    coinfront::http::serve(state, &config.server.bind_address()).await
}

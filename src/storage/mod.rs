//! Storage implementations.

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageConfig, StorageType};
use crate::interfaces::{CartStore, OrderStore, ProductStore, Result, UserStore};

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use memory::{MemoryCartStore, MemoryOrderStore, MemoryProductStore, MemoryUserStore};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteCartStore, SqliteOrderStore, SqliteProductStore, SqliteUserStore};

/// The full set of stores the services run on.
#[derive(Clone)]
pub struct Stores {
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
    pub users: Arc<dyn UserStore>,
    pub carts: Arc<dyn CartStore>,
}

impl Stores {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(MemoryProductStore::new()),
            orders: Arc::new(MemoryOrderStore::new()),
            users: Arc::new(MemoryUserStore::new()),
            carts: Arc::new(MemoryCartStore::new()),
        }
    }

    #[cfg(feature = "sqlite")]
    pub fn sqlite(pool: sqlx::SqlitePool) -> Self {
        Self {
            products: Arc::new(SqliteProductStore::new(pool.clone())),
            orders: Arc::new(SqliteOrderStore::new(pool.clone())),
            users: Arc::new(SqliteUserStore::new(pool.clone())),
            carts: Arc::new(SqliteCartStore::new(pool)),
        }
    }
}

/// Initialize storage based on configuration.
pub async fn init_storage(config: &StorageConfig) -> Result<Stores> {
    info!(storage_type = %config.storage_type, path = %config.path, "Initializing storage");

    match config.storage_type {
        StorageType::Memory => Ok(Stores::in_memory()),
        #[cfg(feature = "sqlite")]
        StorageType::Sqlite => {
            if config.path != sqlite::IN_MEMORY_PATH {
                if let Some(parent) = std::path::Path::new(&config.path).parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
            }

            let pool = sqlite::connect(&config.path, config.max_connections).await?;
            sqlite::init_schema(&pool).await?;

            Ok(Stores::sqlite(pool))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err(crate::interfaces::StorageError::Unsupported(
                "sqlite".to_string(),
            ))
        }
    }
}

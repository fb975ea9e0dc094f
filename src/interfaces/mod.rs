//! Abstract interfaces for storefront persistence.
//!
//! These traits define the contracts for:
//! - Product storage (catalog and stock)
//! - Order storage (purchase records and status)
//! - User storage (accounts)
//! - Cart storage (one cart per user)

pub mod cart_store;
pub mod order_store;
pub mod product_store;
pub mod storage_error;
pub mod user_store;

pub use cart_store::CartStore;
pub use order_store::OrderStore;
pub use product_store::ProductStore;
pub use storage_error::{Result, StorageError};
pub use user_store::UserStore;

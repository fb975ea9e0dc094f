//! In-memory implementations of storage interfaces.
//!
//! Used for `storage.type = memory` and throughout the test suites. State
//! lives for the lifetime of the store.

mod cart_store;
mod order_store;
mod product_store;
mod user_store;

pub use cart_store::MemoryCartStore;
pub use order_store::MemoryOrderStore;
pub use product_store::MemoryProductStore;
pub use user_store::MemoryUserStore;

//! Coinfront: a storefront and back-office for selling in-game currency.
//!
//! Customers browse a catalog, fill a cart and check out against a
//! payment-method fee table. Staff manage products, users and orders and
//! deliver redeem codes for paid orders.

pub mod config;
pub mod domain;
pub mod http;
pub mod interfaces;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::Config;
pub use state::AppState;

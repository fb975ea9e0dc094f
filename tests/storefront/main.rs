//! Storefront behaviour tests using Cucumber.
//!
//! Drives the services end to end over in-memory storage:
//!
//! ```bash
//! cargo test --test storefront
//! ```

mod steps;

use cucumber::World;
use steps::checkout::StorefrontWorld;

#[tokio::main]
async fn main() {
    println!("\n=== Running Storefront Checkout Tests ===\n");
    StorefrontWorld::cucumber()
        .fail_on_skipped()
        .run_and_exit("tests/storefront/features/checkout.feature")
        .await;
}

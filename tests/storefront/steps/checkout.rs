//! Storefront checkout step definitions.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cucumber::gherkin::Step;
use cucumber::{given, then, when, World};
use uuid::Uuid;

use coinfront::config::Config;
use coinfront::domain::{
    ContactInfo, Coupon, DiscountKind, FeeKind, NewProduct, NewUser, Order, OrderStatus,
    PaymentMethod,
};
use coinfront::services::{
    CheckoutRequest, PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, ServiceError,
};
use coinfront::state::AppState;
use coinfront::storage::Stores;

/// Gateway that approves instantly until told to decline.
#[derive(Default)]
struct SwitchableGateway {
    decline: AtomicBool,
}

#[async_trait]
impl PaymentGateway for SwitchableGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        if self.decline.load(Ordering::SeqCst) {
            return Err(PaymentError::Declined("card refused".to_string()));
        }
        Ok(PaymentReceipt {
            reference: format!("BDD-{}", request.order_id),
            processing_time: Duration::ZERO,
        })
    }
}

/// Test context for storefront scenarios.
#[derive(World)]
#[world(init = Self::new)]
pub struct StorefrontWorld {
    config: Config,
    stores: Stores,
    gateway: Arc<SwitchableGateway>,
    state: Option<AppState>,
    products: HashMap<String, Uuid>,
    user_id: Option<Uuid>,
    order: Option<Order>,
    last_error: Option<ServiceError>,
}

impl fmt::Debug for StorefrontWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorefrontWorld")
            .field("products", &self.products)
            .field("user_id", &self.user_id)
            .field("order", &self.order.as_ref().map(|o| &o.id))
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl StorefrontWorld {
    fn new() -> Self {
        Self {
            config: Config::for_test(),
            stores: Stores::in_memory(),
            gateway: Arc::new(SwitchableGateway::default()),
            state: None,
            products: HashMap::new(),
            user_id: None,
            order: None,
            last_error: None,
        }
    }

    /// Services are wired on first use so Background steps can shape config.
    fn state(&mut self) -> AppState {
        if self.state.is_none() {
            self.state = Some(AppState::new(
                &self.config,
                self.stores.clone(),
                self.gateway.clone(),
            ));
        }
        self.state.clone().expect("state initialized above")
    }

    fn user_id(&self) -> Uuid {
        self.user_id.expect("No customer registered")
    }

    fn product_id(&self, name: &str) -> Uuid {
        *self
            .products
            .get(name)
            .unwrap_or_else(|| panic!("Unknown product {}", name))
    }

    fn order_id(&self) -> String {
        self.order.as_ref().expect("No order placed").id.clone()
    }

    fn record<T>(&mut self, result: Result<T, ServiceError>) -> Option<T> {
        match result {
            Ok(value) => {
                self.last_error = None;
                Some(value)
            }
            Err(e) => {
                self.last_error = Some(e);
                None
            }
        }
    }

    async fn add_to_cart(&mut self, quantity: i64, name: &str) {
        let state = self.state();
        let product_id = self.product_id(name);
        let result = state.carts.add_item(self.user_id(), product_id, quantity).await;
        self.record(result);
    }

    async fn checkout(&mut self, method: &str, coupon: Option<&str>) {
        let state = self.state();
        let request = CheckoutRequest {
            payment_method: method.to_string(),
            coupon_code: coupon.map(str::to_string),
            contact: ContactInfo {
                name: "Mika Sato".to_string(),
                email: "mika@example.com".to_string(),
                phone: None,
                game_account_id: "PLAYER-7781".to_string(),
            },
        };
        let result = state.checkout.place_order(self.user_id(), request).await;
        if let Some(order) = self.record(result) {
            self.order = Some(order);
        }
    }

    async fn set_redeem_code(&mut self, code: &str) {
        let state = self.state();
        let result = state.orders.set_redeem_code(&self.order_id(), code).await;
        self.record(result);
    }

    async fn stored_order(&self) -> Order {
        self.stores
            .orders
            .get(&self.order_id())
            .await
            .unwrap()
            .expect("Order missing from store")
    }
}

// --- Given steps ---

#[given(expr = "a storefront with payment methods:")]
async fn given_payment_methods(world: &mut StorefrontWorld, step: &Step) {
    let table = step.table.as_ref().expect("Payment method table required");
    world.config.checkout.payment_methods = table
        .rows
        .iter()
        .skip(1)
        .map(|row| {
            let amount: i64 = row[2].parse().expect("amount must be an integer");
            let fee = match row[1].as_str() {
                "fixed" => FeeKind::Fixed { cents: amount },
                "percentage" => FeeKind::Percentage {
                    basis_points: amount,
                },
                other => panic!("Unknown fee type {}", other),
            };
            PaymentMethod {
                code: row[0].clone(),
                label: row[0].replace('_', " "),
                fee,
                enabled: true,
            }
        })
        .collect();
}

#[given(expr = "a coupon {string} worth {int} percent over {int} cents")]
async fn given_coupon(world: &mut StorefrontWorld, code: String, percent: i64, minimum: i64) {
    world.config.checkout.coupons.push(Coupon {
        code,
        discount: DiscountKind::Percentage {
            basis_points: percent * 100,
        },
        min_subtotal_cents: minimum,
    });
}

#[given(expr = "a product {string} priced {int} cents with {int} in stock")]
async fn given_product(world: &mut StorefrontWorld, name: String, price: i64, stock: i64) {
    let state = world.state();
    let view = state
        .catalog
        .create_product(NewProduct {
            name: name.clone(),
            description: format!("{} for your game account", name),
            category: "gems".to_string(),
            price_cents: price,
            stock,
            published: true,
            image_url: None,
        })
        .await
        .expect("Failed to create product");
    world.products.insert(name, view.product.id);
}

#[given(expr = "a registered customer {string}")]
async fn given_customer(world: &mut StorefrontWorld, email: String) {
    let state = world.state();
    let user = state
        .users
        .register(NewUser {
            email,
            display_name: "Mika".to_string(),
        })
        .await
        .expect("Failed to register customer");
    world.user_id = Some(user.id);
}

#[given(expr = "the customer adds {int} of {string} to the cart")]
async fn given_cart_item(world: &mut StorefrontWorld, quantity: i64, name: String) {
    world.add_to_cart(quantity, &name).await;
    assert!(world.last_error.is_none(), "add failed: {:?}", world.last_error);
}

#[given("the payment gateway declines charges")]
async fn given_gateway_declines(world: &mut StorefrontWorld) {
    world.gateway.decline.store(true, Ordering::SeqCst);
}

#[given(expr = "the customer checks out with {string}")]
async fn given_checked_out(world: &mut StorefrontWorld, method: String) {
    world.checkout(&method, None).await;
    assert!(world.order.is_some(), "checkout failed: {:?}", world.last_error);
}

#[given(expr = "staff set the redeem code {string}")]
async fn given_redeem_code(world: &mut StorefrontWorld, code: String) {
    world.set_redeem_code(&code).await;
    assert!(world.last_error.is_none(), "redeem failed: {:?}", world.last_error);
}

// --- When steps ---

#[when(expr = "the customer adds {int} of {string} to the cart")]
async fn when_cart_item(world: &mut StorefrontWorld, quantity: i64, name: String) {
    world.add_to_cart(quantity, &name).await;
}

#[when(expr = "the customer checks out with {string}")]
async fn when_checkout(world: &mut StorefrontWorld, method: String) {
    world.checkout(&method, None).await;
}

#[when(expr = "the customer checks out with {string} and coupon {string}")]
async fn when_checkout_with_coupon(world: &mut StorefrontWorld, method: String, coupon: String) {
    world.checkout(&method, Some(&coupon)).await;
}

#[when(expr = "staff set the redeem code {string}")]
async fn when_redeem_code(world: &mut StorefrontWorld, code: String) {
    world.set_redeem_code(&code).await;
}

#[when(expr = "staff move the order to {string}")]
async fn when_move_order(world: &mut StorefrontWorld, status: String) {
    let status: OrderStatus = status.parse().expect("Unknown order status");
    let state = world.state();
    let result = state.orders.update_status(&world.order_id(), status).await;
    world.record(result);
}

#[when("the customer cancels the order")]
async fn when_customer_cancels(world: &mut StorefrontWorld) {
    let state = world.state();
    let result = state.orders.cancel(world.user_id(), &world.order_id()).await;
    world.record(result);
}

// --- Then steps ---

#[then(expr = "the order is {string}")]
async fn then_order_status(world: &mut StorefrontWorld, status: String) {
    assert!(world.last_error.is_none(), "last step failed: {:?}", world.last_error);
    assert_eq!(world.stored_order().await.status.as_str(), status);
}

#[then(expr = "the order totals are subtotal {int} discount {int} fee {int} total {int}")]
async fn then_order_totals(
    world: &mut StorefrontWorld,
    subtotal: i64,
    discount: i64,
    fee: i64,
    total: i64,
) {
    let order = world.stored_order().await;
    assert_eq!(order.subtotal_cents, subtotal);
    assert_eq!(order.discount_cents, discount);
    assert_eq!(order.fee_cents, fee);
    assert_eq!(order.total_cents, total);
}

#[then(expr = "{string} has {int} in stock")]
async fn then_stock(world: &mut StorefrontWorld, name: String, stock: i64) {
    let product = world
        .stores
        .products
        .get(world.product_id(&name))
        .await
        .unwrap()
        .expect("Product missing from store");
    assert_eq!(product.stock, stock);
}

#[then("the cart is empty")]
async fn then_cart_empty(world: &mut StorefrontWorld) {
    let state = world.state();
    let cart = state.carts.view(world.user_id()).await.unwrap();
    assert!(cart.items.is_empty());
}

#[then(expr = "the cart holds {int} items")]
async fn then_cart_holds(world: &mut StorefrontWorld, count: i64) {
    let state = world.state();
    let cart = state.carts.view(world.user_id()).await.unwrap();
    assert_eq!(cart.item_count, count);
}

#[then(expr = "checkout fails with {string}")]
async fn then_checkout_fails(world: &mut StorefrontWorld, kind: String) {
    assert_error_kind(world, &kind);
}

#[then(expr = "the request is rejected with {string}")]
async fn then_rejected(world: &mut StorefrontWorld, kind: String) {
    assert_error_kind(world, &kind);
}

#[then(expr = "tracking the order as {string} shows {string}")]
async fn then_tracking_shows(world: &mut StorefrontWorld, email: String, label: String) {
    let state = world.state();
    let view = state
        .orders
        .track(&world.order_id(), &email)
        .await
        .expect("Tracking failed");
    assert_eq!(view.status_label, label);
}

fn assert_error_kind(world: &StorefrontWorld, kind: &str) {
    let err = world.last_error.as_ref().expect("Expected the last step to fail");
    let matched = match kind {
        "invalid" => matches!(err, ServiceError::Invalid(_)),
        "not found" => matches!(err, ServiceError::NotFound { .. }),
        "conflict" => matches!(err, ServiceError::Conflict(_)),
        "forbidden" => matches!(err, ServiceError::Forbidden(_)),
        "payment declined" => matches!(err, ServiceError::PaymentDeclined(_)),
        other => panic!("Unknown error kind {}", other),
    };
    assert!(matched, "expected {} but got {:?}", kind, err);
}

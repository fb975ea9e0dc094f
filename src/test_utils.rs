//! Test utilities and fixtures.
//!
//! Builders for domain records plus a payment gateway that can be told to
//! decline, so service tests run without a database or delays.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    generate_order_id, ContactInfo, Order, OrderItem, OrderStatus, Product, User, UserRole,
    UserStatus,
};
use crate::services::checkout::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest};
use crate::storage::Stores;

pub fn product(name: &str, category: &str, price_cents: i64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: format!("{} for your account", name),
        category: category.to_string(),
        price_cents,
        stock,
        published: true,
        image_url: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        display_name: email.split('@').next().unwrap_or(email).to_string(),
        role: UserRole::Customer,
        status: UserStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

pub fn contact(email: &str) -> ContactInfo {
    ContactInfo {
        name: "Aoi Tanaka".to_string(),
        email: email.to_string(),
        phone: Some("+81-90-0000-0000".to_string()),
        game_account_id: "PLAYER-7781".to_string(),
    }
}

/// A single-line order for 2 units at 500 cents.
pub fn order(user_id: Uuid, status: OrderStatus) -> Order {
    let now = Utc::now();
    Order {
        id: generate_order_id(now),
        user_id,
        contact: contact("mika@example.com"),
        items: vec![OrderItem {
            product_id: Uuid::new_v4(),
            name: "Gems".to_string(),
            unit_price_cents: 500,
            quantity: 2,
        }],
        payment_method: "bank_transfer".to_string(),
        payment_reference: None,
        coupon_code: None,
        subtotal_cents: 1_000,
        fee_cents: 0,
        discount_cents: 0,
        total_cents: 1_000,
        status,
        redeem_code: None,
        created_at: now,
        updated_at: now,
    }
}

/// Insert a product into the given stores and return it.
pub async fn seed_product(stores: &Stores, name: &str, price_cents: i64, stock: i64) -> Product {
    let product = product(name, "gems", price_cents, stock);
    stores.products.insert(&product).await.unwrap();
    product
}

/// Insert an active customer into the given stores and return it.
pub async fn seed_user(stores: &Stores, email: &str) -> User {
    let user = user(email);
    stores.users.insert(&user).await.unwrap();
    user
}

/// Payment gateway that approves instantly unless told to decline.
#[derive(Default)]
pub struct MockPaymentGateway {
    decline: AtomicBool,
    charges: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_decline(&self, decline: bool) {
        self.decline.store(decline, Ordering::SeqCst);
    }

    pub fn charge_count(&self) -> usize {
        self.charges.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn charge(&self, request: &PaymentRequest) -> Result<PaymentReceipt, PaymentError> {
        self.charges.fetch_add(1, Ordering::SeqCst);
        if self.decline.load(Ordering::SeqCst) {
            return Err(PaymentError::Declined(format!(
                "{} declined by test gateway",
                request.payment_method
            )));
        }
        Ok(PaymentReceipt {
            reference: format!("TEST-{}", request.order_id),
            processing_time: Duration::ZERO,
        })
    }
}

//! Checkout: pricing a cart against the fee table and placing orders.

mod payment;

pub use payment::{PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest, SimulatedGateway};

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::errmsg;
use super::error::{Result, ServiceError};
use super::orders::restock;
use super::users::load_active_user;
use super::validation::{require_email, require_text};
use crate::config::CheckoutConfig;
use crate::domain::checkout::quote;
use crate::domain::{
    generate_order_id, Cart, CheckoutQuote, ContactInfo, Coupon, Order, OrderItem, OrderStatus,
    PaymentMethod,
};
use crate::interfaces::{CartStore, OrderStore, ProductStore, UserStore};
use crate::storage::Stores;

/// Customer input for placing an order.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
    pub contact: ContactInfo,
}

pub struct CheckoutService {
    products: Arc<dyn ProductStore>,
    orders: Arc<dyn OrderStore>,
    users: Arc<dyn UserStore>,
    carts: Arc<dyn CartStore>,
    payment_methods: Vec<PaymentMethod>,
    coupons: Vec<Coupon>,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(stores: &Stores, config: &CheckoutConfig, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            products: stores.products.clone(),
            orders: stores.orders.clone(),
            users: stores.users.clone(),
            carts: stores.carts.clone(),
            payment_methods: config.payment_methods.clone(),
            coupons: config.coupons.clone(),
            gateway,
        }
    }

    /// Payment methods a customer can choose.
    pub fn payment_methods(&self) -> Vec<PaymentMethod> {
        self.payment_methods
            .iter()
            .filter(|m| m.enabled)
            .cloned()
            .collect()
    }

    async fn load_cart(&self, user_id: Uuid) -> Result<Cart> {
        match self.carts.get(user_id).await? {
            Some(cart) if !cart.is_empty() => Ok(cart),
            _ => Err(ServiceError::invalid(errmsg::CART_EMPTY)),
        }
    }

    /// Re-read every cart line against the catalog: current price, still
    /// published, enough stock.
    async fn price_lines(&self, cart: &Cart) -> Result<Vec<OrderItem>> {
        let mut lines = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = match self.products.get(item.product_id).await? {
                Some(product) if product.published => product,
                _ => {
                    return Err(ServiceError::Conflict(format!(
                        "{} is no longer available",
                        item.name
                    )))
                }
            };
            if product.stock < item.quantity {
                return Err(ServiceError::Conflict(format!(
                    "only {} of {} in stock",
                    product.stock, product.name
                )));
            }
            lines.push(OrderItem {
                product_id: product.id,
                name: product.name,
                unit_price_cents: product.price_cents,
                quantity: item.quantity,
            });
        }
        Ok(lines)
    }

    fn quote_lines(
        &self,
        lines: &[OrderItem],
        method: &str,
        coupon: Option<&str>,
    ) -> Result<CheckoutQuote> {
        let subtotal = lines
            .iter()
            .try_fold(0i64, |acc, line| acc.checked_add(line.line_total_cents()?))
            .ok_or_else(|| ServiceError::invalid(errmsg::AMOUNT_TOO_LARGE))?;
        Ok(quote(
            &self.payment_methods,
            &self.coupons,
            subtotal,
            method,
            coupon,
        )?)
    }

    pub async fn quote_cart(
        &self,
        user_id: Uuid,
        method: &str,
        coupon: Option<&str>,
    ) -> Result<CheckoutQuote> {
        if self.users.get(user_id).await?.is_none() {
            return Err(ServiceError::not_found("user", user_id));
        }
        let cart = self.load_cart(user_id).await?;
        let lines = self.price_lines(&cart).await?;
        self.quote_lines(&lines, method, coupon)
    }

    /// Take payment for the user's cart and record a paid order.
    ///
    /// Stock is reserved before charging and handed back if the charge or
    /// the order write fails. Once the order is stored, the ordered
    /// quantities are taken off the cart as it stands then, so anything
    /// added while the payment was running stays in the cart.
    pub async fn place_order(&self, user_id: Uuid, request: CheckoutRequest) -> Result<Order> {
        load_active_user(self.users.as_ref(), user_id).await?;
        let contact = normalize_contact(request.contact)?;

        let cart = self.load_cart(user_id).await?;
        let lines = self.price_lines(&cart).await?;
        let quote = self.quote_lines(
            &lines,
            &request.payment_method,
            request.coupon_code.as_deref(),
        )?;

        self.reserve(&lines).await?;

        let now = Utc::now();
        let order_id = generate_order_id(now);
        let charge = PaymentRequest {
            order_id: order_id.clone(),
            payment_method: quote.payment_method.clone(),
            amount_cents: quote.total_cents,
        };
        let receipt = match self.gateway.charge(&charge).await {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(order_id = %order_id, error = %e, "Payment failed, releasing stock");
                restock(self.products.as_ref(), &lines).await;
                return Err(ServiceError::PaymentDeclined(e.to_string()));
            }
        };

        let now = Utc::now();
        let order = Order {
            id: order_id,
            user_id,
            contact,
            items: lines,
            payment_method: quote.payment_method,
            payment_reference: Some(receipt.reference),
            coupon_code: quote.coupon_code,
            subtotal_cents: quote.subtotal_cents,
            fee_cents: quote.fee_cents,
            discount_cents: quote.discount_cents,
            total_cents: quote.total_cents,
            status: OrderStatus::Paid,
            redeem_code: None,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = self.orders.insert(&order).await {
            warn!(order_id = %order.id, error = %e, "Order write failed, releasing stock");
            restock(self.products.as_ref(), &order.items).await;
            return Err(e.into());
        }

        if let Err(e) = self.release_cart_lines(user_id, &order.items).await {
            warn!(order_id = %order.id, error = %e, "Order placed but cart was not updated");
        }

        info!(
            order_id = %order.id,
            user_id = %user_id,
            total_cents = order.total_cents,
            payment_ms = receipt.processing_time.as_millis() as u64,
            "Order placed"
        );
        Ok(order)
    }

    async fn release_cart_lines(&self, user_id: Uuid, items: &[OrderItem]) -> Result<()> {
        let Some(mut cart) = self.carts.get(user_id).await? else {
            return Ok(());
        };
        let now = Utc::now();
        for item in items {
            cart.deduct(item.product_id, item.quantity, now);
        }
        self.carts.put(&cart).await?;
        Ok(())
    }

    async fn reserve(&self, lines: &[OrderItem]) -> Result<()> {
        for (reserved, line) in lines.iter().enumerate() {
            if let Err(e) = self.products.adjust_stock(line.product_id, -line.quantity).await {
                restock(self.products.as_ref(), &lines[..reserved]).await;
                return Err(e.into());
            }
        }
        Ok(())
    }
}

fn normalize_contact(contact: ContactInfo) -> Result<ContactInfo> {
    require_text(&contact.name, errmsg::CONTACT_NAME_REQUIRED)?;
    require_text(&contact.game_account_id, errmsg::GAME_ACCOUNT_REQUIRED)?;
    require_email(&contact.email, errmsg::EMAIL_INVALID)?;

    Ok(ContactInfo {
        name: contact.name.trim().to_string(),
        email: contact.email.trim().to_string(),
        phone: contact
            .phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        game_account_id: contact.game_account_id.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscountKind, UserPatch, UserStatus};
    use crate::test_utils::{contact, seed_product, seed_user, MockPaymentGateway};
    use crate::services::CartService;

    struct Fixture {
        stores: Stores,
        carts: CartService,
        checkout: CheckoutService,
        gateway: Arc<MockPaymentGateway>,
    }

    fn fixture() -> Fixture {
        let stores = Stores::in_memory();
        let gateway = MockPaymentGateway::new();
        let config = CheckoutConfig {
            coupons: vec![Coupon {
                code: "WELCOME10".to_string(),
                discount: DiscountKind::Percentage { basis_points: 1_000 },
                min_subtotal_cents: 1_000,
            }],
            ..Default::default()
        };
        Fixture {
            carts: CartService::new(
                stores.carts.clone(),
                stores.products.clone(),
                stores.users.clone(),
            ),
            checkout: CheckoutService::new(&stores, &config, gateway.clone()),
            stores,
            gateway,
        }
    }

    fn request(method: &str) -> CheckoutRequest {
        CheckoutRequest {
            payment_method: method.to_string(),
            coupon_code: None,
            contact: contact("mika@example.com"),
        }
    }

    #[tokio::test]
    async fn test_place_order_happy_path() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 10).await;
        f.carts.add_item(user.id, gems.id, 3).await.unwrap();

        let order = f
            .checkout
            .place_order(user.id, request("credit_card"))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.subtotal_cents, 3_000);
        // 2.9% of 3000 = 87
        assert_eq!(order.fee_cents, 87);
        assert_eq!(order.total_cents, 3_087);
        assert!(order.id.starts_with("ORD-"));
        assert!(order.payment_reference.as_deref().unwrap().starts_with("TEST-"));

        let stock = f.stores.products.get(gems.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 7);
        assert!(f.carts.view(user.id).await.unwrap().items.is_empty());
        assert!(f.stores.orders.get(&order.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_quote_applies_discount_before_fee() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 10).await;
        f.carts.add_item(user.id, gems.id, 2).await.unwrap();

        let quote = f
            .checkout
            .quote_cart(user.id, "e_wallet", Some("welcome10"))
            .await
            .unwrap();

        assert_eq!(quote.discount_cents, 200);
        // 1.5% of 1800 = 27
        assert_eq!(quote.fee_cents, 27);
        assert_eq!(quote.total_cents, 1_827);
        assert_eq!(quote.coupon_code.as_deref(), Some("WELCOME10"));
    }

    #[tokio::test]
    async fn test_quote_rejects_unknown_method_and_coupon() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 10).await;
        f.carts.add_item(user.id, gems.id, 1).await.unwrap();

        assert!(matches!(
            f.checkout.quote_cart(user.id, "barter", None).await,
            Err(ServiceError::Invalid(_))
        ));
        assert!(matches!(
            f.checkout.quote_cart(user.id, "e_wallet", Some("NOPE")).await,
            Err(ServiceError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_cart_rejected() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;

        let err = f
            .checkout
            .place_order(user.id, request("bank_transfer"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(f.gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_contact_validation() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 10).await;
        f.carts.add_item(user.id, gems.id, 1).await.unwrap();

        let mut bad_email = request("bank_transfer");
        bad_email.contact.email = "mika.example.com".to_string();
        let mut no_account = request("bank_transfer");
        no_account.contact.game_account_id = "  ".to_string();

        for req in [bad_email, no_account] {
            let err = f.checkout.place_order(user.id, req).await.unwrap_err();
            assert!(matches!(err, ServiceError::Invalid(_)));
        }
        assert_eq!(f.gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_declined_payment_restores_stock_and_keeps_cart() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 10).await;
        f.carts.add_item(user.id, gems.id, 4).await.unwrap();
        f.gateway.set_decline(true);

        let err = f
            .checkout
            .place_order(user.id, request("credit_card"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::PaymentDeclined(_)));
        let stock = f.stores.products.get(gems.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);
        assert_eq!(f.carts.view(user.id).await.unwrap().item_count, 4);
        assert!(f.stores.orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_revalidated_at_checkout() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 5).await;
        f.carts.add_item(user.id, gems.id, 5).await.unwrap();
        f.stores.products.adjust_stock(gems.id, -3).await.unwrap();

        let err = f
            .checkout
            .place_order(user.id, request("bank_transfer"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(f.gateway.charge_count(), 0);
    }

    #[tokio::test]
    async fn test_current_price_used_at_checkout() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let mut gems = seed_product(&f.stores, "Gems", 1_000, 5).await;
        f.carts.add_item(user.id, gems.id, 1).await.unwrap();
        gems.price_cents = 1_200;
        f.stores.products.update(&gems).await.unwrap();

        let order = f
            .checkout
            .place_order(user.id, request("bank_transfer"))
            .await
            .unwrap();
        assert_eq!(order.total_cents, 1_200);
    }

    #[tokio::test]
    async fn test_suspended_user_cannot_checkout() {
        let f = fixture();
        let mut user = seed_user(&f.stores, "mika@example.com").await;
        let gems = seed_product(&f.stores, "Gems", 1_000, 5).await;
        f.carts.add_item(user.id, gems.id, 1).await.unwrap();

        UserPatch {
            status: Some(UserStatus::Suspended),
            ..Default::default()
        }
        .apply(&mut user, Utc::now());
        f.stores.users.update(&user).await.unwrap();

        let err = f
            .checkout
            .place_order(user.id, request("bank_transfer"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_items_added_during_payment_stay_in_cart() {
        let stores = Stores::in_memory();
        let carts = CartService::new(
            stores.carts.clone(),
            stores.products.clone(),
            stores.users.clone(),
        );
        let gateway = Arc::new(SimulatedGateway::new(std::time::Duration::from_millis(300)));
        let checkout = CheckoutService::new(&stores, &CheckoutConfig::default(), gateway);

        let user = seed_user(&stores, "mika@example.com").await;
        let gems = seed_product(&stores, "Gems", 1_000, 10).await;
        let pass = seed_product(&stores, "Pass", 500, 10).await;
        carts.add_item(user.id, gems.id, 2).await.unwrap();

        let add_during_payment = async {
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
            carts.add_item(user.id, pass.id, 1).await.unwrap();
            carts.add_item(user.id, gems.id, 1).await.unwrap();
        };
        let (order, ()) = tokio::join!(
            checkout.place_order(user.id, request("bank_transfer")),
            add_during_payment
        );
        let order = order.unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 2);

        let cart = carts.view(user.id).await.unwrap();
        assert_eq!(cart.items.len(), 2);
        let quantity = |id: Uuid| {
            cart.items
                .iter()
                .find(|l| l.item.product_id == id)
                .map(|l| l.item.quantity)
        };
        assert_eq!(quantity(pass.id), Some(1));
        assert_eq!(quantity(gems.id), Some(1));
    }

    #[tokio::test]
    async fn test_oversized_order_total_rejected() {
        let f = fixture();
        let user = seed_user(&f.stores, "mika@example.com").await;
        let whale = seed_product(&f.stores, "Whale Pack", i64::MAX / 2, 10).await;
        f.carts.add_item(user.id, whale.id, 3).await.unwrap();

        let err = f
            .checkout
            .place_order(user.id, request("bank_transfer"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid(_)));
        assert_eq!(f.gateway.charge_count(), 0);

        let stock = f.stores.products.get(whale.id).await.unwrap().unwrap().stock;
        assert_eq!(stock, 10);
    }

    #[test]
    fn test_normalize_contact_drops_blank_phone() {
        let mut input = contact("mika@example.com");
        input.phone = Some("  ".to_string());
        input.name = "  Mika ".to_string();

        let contact = normalize_contact(input).unwrap();
        assert_eq!(contact.name, "Mika");
        assert!(contact.phone.is_none());
    }
}

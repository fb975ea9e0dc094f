//! Per-user shopping carts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use super::errmsg;
use super::error::{Result, ServiceError};
use super::users::load_active_user;
use super::validation::{require_non_negative, require_positive};
use crate::domain::{Cart, CartItem, Product};
use crate::interfaces::{CartStore, ProductStore, UserStore};

/// A cart line with its computed total.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub item: CartItem,
    pub line_total_cents: i64,
}

/// A cart as shown to the customer.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub user_id: Uuid,
    pub items: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal_cents: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<Cart> for CartView {
    fn from(cart: Cart) -> Self {
        let item_count = cart.item_count();
        let subtotal_cents = cart.subtotal_cents();
        let items = cart
            .items
            .into_iter()
            .map(|item| CartLine {
                line_total_cents: item.line_total_cents(),
                item,
            })
            .collect();

        Self {
            user_id: cart.user_id,
            items,
            item_count,
            subtotal_cents,
            updated_at: cart.updated_at,
        }
    }
}

pub struct CartService {
    carts: Arc<dyn CartStore>,
    products: Arc<dyn ProductStore>,
    users: Arc<dyn UserStore>,
}

impl CartService {
    pub fn new(
        carts: Arc<dyn CartStore>,
        products: Arc<dyn ProductStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            carts,
            products,
            users,
        }
    }

    /// The stored cart, or an empty one if the user has none yet.
    pub(crate) async fn load(&self, user_id: Uuid) -> Result<Cart> {
        Ok(self
            .carts
            .get(user_id)
            .await?
            .unwrap_or_else(|| Cart::new(user_id, Utc::now())))
    }

    async fn sellable_product(&self, product_id: Uuid) -> Result<Product> {
        match self.products.get(product_id).await? {
            Some(product) if product.published => Ok(product),
            _ => Err(ServiceError::not_found("product", product_id)),
        }
    }

    pub async fn view(&self, user_id: Uuid) -> Result<CartView> {
        if self.users.get(user_id).await?.is_none() {
            return Err(ServiceError::not_found("user", user_id));
        }
        Ok(self.load(user_id).await?.into())
    }

    /// Add `quantity` units of a product, merging with an existing line.
    pub async fn add_item(&self, user_id: Uuid, product_id: Uuid, quantity: i64) -> Result<CartView> {
        require_positive(quantity, errmsg::QUANTITY_POSITIVE)?;
        load_active_user(self.users.as_ref(), user_id).await?;

        let product = self.sellable_product(product_id).await?;
        if product.stock <= 0 {
            return Err(ServiceError::Conflict(format!("{} is out of stock", product.name)));
        }

        let mut cart = self.load(user_id).await?;
        let wanted = cart.quantity_of(product_id).saturating_add(quantity);
        ensure_stock(&product, wanted)?;

        cart.upsert(line_for(&product, wanted), Utc::now());
        self.carts.put(&cart).await?;

        debug!(user_id = %user_id, product_id = %product_id, quantity = wanted, "Cart item added");
        Ok(cart.into())
    }

    /// Set a line's quantity. Zero removes the line.
    pub async fn update_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i64,
    ) -> Result<CartView> {
        require_non_negative(quantity, errmsg::QUANTITY_NON_NEGATIVE)?;
        load_active_user(self.users.as_ref(), user_id).await?;

        let mut cart = self.load(user_id).await?;
        let existing = cart
            .items
            .iter()
            .find(|i| i.product_id == product_id)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("cart item", product_id))?;

        if quantity == 0 {
            cart.remove(product_id, Utc::now());
        } else {
            let product = self.sellable_product(product_id).await?;
            ensure_stock(&product, quantity)?;
            cart.upsert(CartItem { quantity, ..existing }, Utc::now());
        }
        self.carts.put(&cart).await?;

        debug!(user_id = %user_id, product_id = %product_id, quantity, "Cart quantity updated");
        Ok(cart.into())
    }

    pub async fn remove_item(&self, user_id: Uuid, product_id: Uuid) -> Result<CartView> {
        load_active_user(self.users.as_ref(), user_id).await?;

        let mut cart = self.load(user_id).await?;
        if !cart.remove(product_id, Utc::now()) {
            return Err(ServiceError::not_found("cart item", product_id));
        }
        self.carts.put(&cart).await?;
        Ok(cart.into())
    }

    pub async fn clear(&self, user_id: Uuid) -> Result<CartView> {
        load_active_user(self.users.as_ref(), user_id).await?;

        let mut cart = self.load(user_id).await?;
        cart.clear(Utc::now());
        self.carts.put(&cart).await?;
        Ok(cart.into())
    }
}

fn ensure_stock(product: &Product, quantity: i64) -> Result<()> {
    if quantity > product.stock {
        return Err(ServiceError::Conflict(format!(
            "only {} of {} in stock",
            product.stock, product.name
        )));
    }
    Ok(())
}

fn line_for(product: &Product, quantity: i64) -> CartItem {
    CartItem {
        product_id: product.id,
        name: product.name.clone(),
        unit_price_cents: product.price_cents,
        quantity,
    }
}

//! Shopping cart state.
//!
//! Items are keyed by product id; adding a product already in the cart
//! raises its quantity instead of adding a second line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
}

impl CartItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: Uuid,
    pub items: Vec<CartItem>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            items: Vec::new(),
            updated_at: now,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantity times unit price over all lines, saturating at
    /// `i64::MAX`. Checkout prices lines with checked arithmetic instead.
    pub fn subtotal_cents(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.line_total_cents()))
    }

    pub fn item_count(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |acc, i| acc.saturating_add(i.quantity))
    }

    pub fn quantity_of(&self, product_id: Uuid) -> i64 {
        self.items
            .iter()
            .find(|i| i.product_id == product_id)
            .map(|i| i.quantity)
            .unwrap_or(0)
    }

    /// Insert a line or replace the quantity and price of an existing one.
    pub fn upsert(&mut self, item: CartItem, now: DateTime<Utc>) {
        match self
            .items
            .iter_mut()
            .find(|i| i.product_id == item.product_id)
        {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.updated_at = now;
    }

    /// Returns whether a line was removed.
    pub fn remove(&mut self, product_id: Uuid, now: DateTime<Utc>) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.updated_at = now;
        self.items.len() != before
    }

    /// Take `quantity` units off a line, dropping the line when nothing is
    /// left. Lines for other products are untouched.
    pub fn deduct(&mut self, product_id: Uuid, quantity: i64, now: DateTime<Utc>) {
        for item in self.items.iter_mut().filter(|i| i.product_id == product_id) {
            item.quantity = item.quantity.saturating_sub(quantity);
        }
        self.items.retain(|i| i.quantity > 0);
        self.updated_at = now;
    }

    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.items.clear();
        self.updated_at = now;
    }
}

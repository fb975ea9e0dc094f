//! Catalog products.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ParseLabelError;

/// Stock level at or below which a product is shown as low stock.
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 10;

/// Highest unit price an admin may set, in cents.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
/// Highest stock level a product may hold.
pub const MAX_STOCK: i64 = 1_000_000_000;

/// Stock-derived product status. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    Active,
    LowStock,
    OutOfStock,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 3] = [
        ProductStatus::Active,
        ProductStatus::LowStock,
        ProductStatus::OutOfStock,
    ];

    /// Derive the status from a stock count.
    pub fn from_stock(stock: i64, low_stock_threshold: i64) -> Self {
        if stock <= 0 {
            ProductStatus::OutOfStock
        } else if stock <= low_stock_threshold {
            ProductStatus::LowStock
        } else {
            ProductStatus::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Active => "active",
            ProductStatus::LowStock => "low_stock",
            ProductStatus::OutOfStock => "out_of_stock",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseLabelError::new("product status", s))
    }
}

/// A catalog entry. Prices are integer cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    pub stock: i64,
    pub published: bool,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn status(&self, low_stock_threshold: i64) -> ProductStatus {
        ProductStatus::from_stock(self.stock, low_stock_threshold)
    }
}

/// Admin input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub price_cents: i64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_published() -> bool {
    true
}

impl NewProduct {
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category.trim().to_string(),
            price_cents: self.price_cents,
            stock: self.stock,
            published: self.published,
            image_url: self.image_url,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for a product. Stock is changed through stock adjustment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub published: Option<bool>,
    pub image_url: Option<String>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_string();
        }
        if let Some(price_cents) = self.price_cents {
            product.price_cents = price_cents;
        }
        if let Some(published) = self.published {
            product.published = published;
        }
        if let Some(image_url) = self.image_url {
            product.image_url = if image_url.is_empty() {
                None
            } else {
                Some(image_url)
            };
        }
        product.updated_at = now;
    }
}

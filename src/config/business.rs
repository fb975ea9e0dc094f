//! Catalog and checkout configuration types.

use std::collections::HashSet;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::checkout::{default_payment_methods, DiscountKind, FeeKind};
use crate::domain::{Coupon, PaymentMethod, DEFAULT_LOW_STOCK_THRESHOLD};

/// Catalog presentation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Stock level at or below which products show as `low_stock`.
    pub low_stock_threshold: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

/// Checkout settings: the fee table, coupons and simulated payment delay.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// How long the simulated payment takes, in milliseconds.
    pub payment_delay_ms: u64,
    /// Payment-method fee table.
    pub payment_methods: Vec<PaymentMethod>,
    /// Accepted coupon codes.
    pub coupons: Vec<Coupon>,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_delay_ms: 2_000,
            payment_methods: default_payment_methods(),
            coupons: Vec::new(),
        }
    }
}

impl CheckoutConfig {
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    /// Check the fee table and coupons for values that would misprice orders.
    pub fn validate(&self) -> Result<(), String> {
        if self.payment_methods.is_empty() {
            return Err("checkout.payment_methods must not be empty".to_string());
        }

        let mut codes = HashSet::new();
        for method in &self.payment_methods {
            if method.code.is_empty() {
                return Err("payment method code must not be empty".to_string());
            }
            if !codes.insert(method.code.as_str()) {
                return Err(format!("duplicate payment method: {}", method.code));
            }
            let negative = match method.fee {
                FeeKind::Fixed { cents } => cents < 0,
                FeeKind::Percentage { basis_points } => basis_points < 0,
            };
            if negative {
                return Err(format!("payment method {} has a negative fee", method.code));
            }
        }

        let mut coupon_codes = HashSet::new();
        for coupon in &self.coupons {
            if !coupon_codes.insert(coupon.code.to_ascii_uppercase()) {
                return Err(format!("duplicate coupon: {}", coupon.code));
            }
            let valid = match coupon.discount {
                DiscountKind::Fixed { cents } => cents > 0,
                DiscountKind::Percentage { basis_points } => (1..=10_000).contains(&basis_points),
            };
            if !valid {
                return Err(format!("coupon {} has an invalid discount", coupon.code));
            }
        }

        Ok(())
    }
}

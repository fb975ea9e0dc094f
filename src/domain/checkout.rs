//! Checkout fee table and quote arithmetic.
//!
//! A quote applies the coupon discount to the subtotal first, then adds the
//! payment-method fee computed on the discounted amount. Percentages are in
//! basis points and round half-up to whole cents.

use serde::{Deserialize, Serialize};

/// Fee charged by a payment method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FeeKind {
    Fixed { cents: i64 },
    Percentage { basis_points: i64 },
}

impl FeeKind {
    /// Fee on `amount_cents`, or `None` if it does not fit in cents.
    pub fn fee_for(&self, amount_cents: i64) -> Option<i64> {
        match *self {
            FeeKind::Fixed { cents } => Some(cents),
            FeeKind::Percentage { basis_points } => {
                i64::try_from(percent_of(amount_cents, basis_points)).ok()
            }
        }
    }
}

/// Discount granted by a coupon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountKind {
    Fixed { cents: i64 },
    Percentage { basis_points: i64 },
}

impl DiscountKind {
    /// Discount on `subtotal_cents`, never more than the subtotal itself.
    pub fn discount_for(&self, subtotal_cents: i64) -> i64 {
        let raw = match *self {
            DiscountKind::Fixed { cents } => i128::from(cents),
            DiscountKind::Percentage { basis_points } => percent_of(subtotal_cents, basis_points),
        };
        let capped = raw.clamp(0, i128::from(subtotal_cents.max(0)));
        // Clamped into 0..=subtotal, so it always fits.
        i64::try_from(capped).unwrap_or(0)
    }
}

/// Widened to i128 so the product of two i64 values cannot overflow.
fn percent_of(amount_cents: i64, basis_points: i64) -> i128 {
    (i128::from(amount_cents) * i128::from(basis_points) + 5_000) / 10_000
}

/// One row of the fee table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub code: String,
    pub label: String,
    pub fee: FeeKind,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    pub discount: DiscountKind,
    #[serde(default)]
    pub min_subtotal_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutQuote {
    pub payment_method: String,
    pub coupon_code: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub fee_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuoteError {
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
    #[error("payment method is not available: {0}")]
    PaymentMethodDisabled(String),
    #[error("unknown coupon: {0}")]
    UnknownCoupon(String),
    #[error("coupon {code} requires a subtotal of at least {minimum_cents} cents")]
    MinimumNotMet { code: String, minimum_cents: i64 },
    #[error("order total is too large")]
    AmountTooLarge,
}

/// Fee table used when configuration does not provide one.
pub fn default_payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            code: "bank_transfer".to_string(),
            label: "Bank transfer".to_string(),
            fee: FeeKind::Fixed { cents: 0 },
            enabled: true,
        },
        PaymentMethod {
            code: "e_wallet".to_string(),
            label: "E-wallet".to_string(),
            fee: FeeKind::Percentage { basis_points: 150 },
            enabled: true,
        },
        PaymentMethod {
            code: "credit_card".to_string(),
            label: "Credit card".to_string(),
            fee: FeeKind::Percentage { basis_points: 290 },
            enabled: true,
        },
        PaymentMethod {
            code: "convenience_store".to_string(),
            label: "Convenience store".to_string(),
            fee: FeeKind::Fixed { cents: 2_500 },
            enabled: true,
        },
    ]
}

/// Price a subtotal against the fee table and an optional coupon.
pub fn quote(
    methods: &[PaymentMethod],
    coupons: &[Coupon],
    subtotal_cents: i64,
    method_code: &str,
    coupon_code: Option<&str>,
) -> Result<CheckoutQuote, QuoteError> {
    let method = methods
        .iter()
        .find(|m| m.code == method_code)
        .ok_or_else(|| QuoteError::UnknownPaymentMethod(method_code.to_string()))?;
    if !method.enabled {
        return Err(QuoteError::PaymentMethodDisabled(method.code.clone()));
    }

    let coupon = match coupon_code.map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            let coupon = coupons
                .iter()
                .find(|c| c.code.eq_ignore_ascii_case(code))
                .ok_or_else(|| QuoteError::UnknownCoupon(code.to_string()))?;
            if subtotal_cents < coupon.min_subtotal_cents {
                return Err(QuoteError::MinimumNotMet {
                    code: coupon.code.clone(),
                    minimum_cents: coupon.min_subtotal_cents,
                });
            }
            Some(coupon)
        }
        None => None,
    };

    let discount_cents = coupon
        .map(|c| c.discount.discount_for(subtotal_cents))
        .unwrap_or(0);
    let discounted = subtotal_cents - discount_cents;
    let fee_cents = method
        .fee
        .fee_for(discounted)
        .ok_or(QuoteError::AmountTooLarge)?;
    let total_cents = discounted
        .checked_add(fee_cents)
        .ok_or(QuoteError::AmountTooLarge)?;

    Ok(CheckoutQuote {
        payment_method: method.code.clone(),
        coupon_code: coupon.map(|c| c.code.clone()),
        subtotal_cents,
        discount_cents,
        fee_cents,
        total_cents,
    })
}

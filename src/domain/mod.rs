//! Storefront domain types.
//!
//! Plain data plus the small amount of pure logic that belongs to it:
//! derived product status, the order lifecycle, cart arithmetic and the
//! checkout fee table.

pub mod cart;
pub mod checkout;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartItem};
pub use checkout::{CheckoutQuote, Coupon, DiscountKind, FeeKind, PaymentMethod, QuoteError};
pub use order::{generate_order_id, ContactInfo, Order, OrderItem, OrderStatus, TransitionError};
pub use product::{
    NewProduct, Product, ProductPatch, ProductStatus, DEFAULT_LOW_STOCK_THRESHOLD,
    MAX_PRICE_CENTS, MAX_STOCK,
};
pub use user::{NewUser, User, UserPatch, UserRole, UserStatus};

/// Error returned when parsing a status or role label fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseLabelError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseLabelError {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

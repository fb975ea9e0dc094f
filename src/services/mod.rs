//! Storefront and back-office services.
//!
//! Each service owns the stores it needs and enforces the business rules
//! on top of them. HTTP handlers call these and nothing lower.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod dashboard;
pub mod error;
pub mod orders;
pub mod users;
pub mod validation;

pub use cart::{CartLine, CartService, CartView};
pub use catalog::{CatalogPage, CatalogQuery, CatalogService, ProductSort, ProductView};
pub use checkout::{
    CheckoutRequest, CheckoutService, PaymentError, PaymentGateway, PaymentReceipt,
    PaymentRequest, SimulatedGateway,
};
pub use dashboard::{DashboardService, DashboardSummary, UserCounts};
pub use error::{Result, ServiceError};
pub use orders::{OrderFilter, OrderService, OrderView};
pub use users::UserService;

/// Error message constants.
pub mod errmsg {
    pub const PRODUCT_NAME_REQUIRED: &str = "Product name is required";
    pub const PRODUCT_CATEGORY_REQUIRED: &str = "Product category is required";
    pub const PRICE_POSITIVE: &str = "Price must be positive";
    pub const PRICE_TOO_HIGH: &str = "Price exceeds the maximum allowed";
    pub const STOCK_NON_NEGATIVE: &str = "Stock cannot be negative";
    pub const STOCK_TOO_HIGH: &str = "Stock exceeds the maximum allowed";
    pub const PRICE_RANGE_INVERTED: &str = "Minimum price cannot exceed maximum price";
    pub const QUANTITY_POSITIVE: &str = "Quantity must be positive";
    pub const QUANTITY_NON_NEGATIVE: &str = "Quantity cannot be negative";
    pub const CART_EMPTY: &str = "Cart is empty";
    pub const AMOUNT_TOO_LARGE: &str = "Order total is too large";
    pub const CONTACT_NAME_REQUIRED: &str = "Contact name is required";
    pub const GAME_ACCOUNT_REQUIRED: &str = "Game account ID is required";
    pub const EMAIL_INVALID: &str = "A valid email address is required";
    pub const EMAIL_TAKEN: &str = "Email is already registered";
    pub const DISPLAY_NAME_REQUIRED: &str = "Display name is required";
    pub const USER_SUSPENDED: &str = "Account is suspended";
    pub const ORDER_NOT_CANCELLABLE: &str = "Only pending or paid orders can be cancelled";
    pub const ORDER_NOT_PAID: &str = "Order has not been paid";
    pub const ORDER_CHANGED: &str = "Order was changed by another request, reload and retry";
    pub const REDEEM_CODE_REQUIRED: &str = "Redeem code is required";
}

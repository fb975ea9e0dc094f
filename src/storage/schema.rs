//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query building.

use sea_query::Iden;

/// Product catalog.
#[derive(Iden, Clone, Copy)]
pub enum Products {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "description"]
    Description,
    #[iden = "category"]
    Category,
    #[iden = "price_cents"]
    PriceCents,
    #[iden = "stock"]
    Stock,
    #[iden = "published"]
    Published,
    #[iden = "image_url"]
    ImageUrl,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Customer orders. Line items are stored as a JSON array.
#[derive(Iden, Clone, Copy)]
pub enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "contact_name"]
    ContactName,
    #[iden = "contact_email"]
    ContactEmail,
    #[iden = "contact_phone"]
    ContactPhone,
    #[iden = "game_account_id"]
    GameAccountId,
    #[iden = "items"]
    Items,
    #[iden = "payment_method"]
    PaymentMethod,
    #[iden = "payment_reference"]
    PaymentReference,
    #[iden = "coupon_code"]
    CouponCode,
    #[iden = "subtotal_cents"]
    SubtotalCents,
    #[iden = "fee_cents"]
    FeeCents,
    #[iden = "discount_cents"]
    DiscountCents,
    #[iden = "total_cents"]
    TotalCents,
    #[iden = "status"]
    Status,
    #[iden = "redeem_code"]
    RedeemCode,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// Storefront accounts.
#[derive(Iden, Clone, Copy)]
pub enum Users {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "email"]
    Email,
    #[iden = "display_name"]
    DisplayName,
    #[iden = "role"]
    Role,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
    #[iden = "updated_at"]
    UpdatedAt,
}

/// One cart per user. Items are stored as a JSON array.
#[derive(Iden, Clone, Copy)]
pub enum Carts {
    Table,
    #[iden = "user_id"]
    UserId,
    #[iden = "items"]
    Items,
    #[iden = "updated_at"]
    UpdatedAt,
}

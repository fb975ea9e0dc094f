//! Cucumber step definitions for storefront tests.

pub mod checkout;

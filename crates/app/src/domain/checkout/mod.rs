//! Checkout
//!
//! Order building, payment reconciliation and the [`CheckoutService`] that
//! ties them to carts and the payment gateway.

mod builder;
pub mod errors;
pub mod models;
mod reconciliation;
mod service;

pub use builder::OrderBuilder;
pub use errors::CheckoutError;
pub use reconciliation::ReconciliationEngine;
pub use service::*;

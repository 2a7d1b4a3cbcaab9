//! Checkout errors.

use thiserror::Error;

use crate::domain::{
    carts::{CartsServiceError, models::CartError},
    inventory::{InventoryServiceError, models::VariantUuid},
    orders::{OrdersServiceError, pricing::PricingError},
};

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("insufficient stock for variant {variant}: {available} available")]
    InsufficientStock { variant: VariantUuid, available: u64 },

    #[error("cart line not found")]
    NotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("variant not found")]
    VariantNotFound,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("order total is too large")]
    TotalOverflow,

    /// The gateway could not give an authoritative answer. Retrying may help.
    #[error("payment gateway unavailable: {detail}")]
    TransportFailure { detail: String },

    /// The gateway rejected the payment. The order will not be confirmed.
    #[error("payment rejected: {reason}")]
    GatewayRejected { reason: String },

    #[error("payment reference does not belong to this order")]
    ReferenceMismatch,

    #[error("verified payment does not match the order total")]
    AmountMismatch,

    /// The order changed between being read and being updated.
    #[error("order was modified concurrently")]
    Conflict,

    #[error("cart storage error")]
    Carts(#[source] CartsServiceError),

    #[error("order storage error")]
    Orders(#[source] OrdersServiceError),

    #[error("inventory storage error")]
    Inventory(#[source] InventoryServiceError),
}

impl CheckoutError {
    /// Whether the same request may succeed if repeated later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure { .. } | Self::Conflict)
    }
}

impl From<CartError> for CheckoutError {
    fn from(error: CartError) -> Self {
        match error {
            CartError::NotFound => Self::NotFound,
            CartError::InvalidQuantity => Self::InvalidQuantity,
            CartError::TotalOverflow => Self::TotalOverflow,
        }
    }
}

impl From<PricingError> for CheckoutError {
    fn from(error: PricingError) -> Self {
        match error {
            PricingError::Overflow => Self::TotalOverflow,
        }
    }
}

impl From<CartsServiceError> for CheckoutError {
    fn from(error: CartsServiceError) -> Self {
        Self::Carts(error)
    }
}

impl From<OrdersServiceError> for CheckoutError {
    fn from(error: OrdersServiceError) -> Self {
        match error {
            OrdersServiceError::NotFound => Self::OrderNotFound,
            other => Self::Orders(other),
        }
    }
}

impl From<InventoryServiceError> for CheckoutError {
    fn from(error: InventoryServiceError) -> Self {
        match error {
            InventoryServiceError::NotFound => Self::VariantNotFound,
            InventoryServiceError::InsufficientStock { variant, available } => {
                Self::InsufficientStock { variant, available }
            }
            other => Self::Inventory(other),
        }
    }
}

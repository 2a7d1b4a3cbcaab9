//! Checkout Models

use crate::domain::{
    carts::models::{Cart, CartUpdate},
    orders::models::Order,
};

/// A cart after a mutation, with what the mutation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartChange {
    pub cart: Cart,
    pub update: CartUpdate,
}

/// Outcome of applying a verification result to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// This call moved the order to `{confirmed, paid}` and took its stock.
    Confirmed(Order),

    /// This call recorded the payment as failed.
    Rejected { order: Order, reason: String },

    /// The order had already been settled; nothing changed except for
    /// completing any outstanding stock decrements.
    AlreadyReconciled(Order),
}

/// Successful outcome of a confirmation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed(Order),
    AlreadyReconciled(Order),
}

impl Confirmation {
    #[must_use]
    pub fn order(&self) -> &Order {
        match self {
            Self::Confirmed(order) | Self::AlreadyReconciled(order) => order,
        }
    }

    #[must_use]
    pub fn into_order(self) -> Order {
        match self {
            Self::Confirmed(order) | Self::AlreadyReconciled(order) => order,
        }
    }
}

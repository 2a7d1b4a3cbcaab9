//! Cart request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    carts::models::{Cart, CartError, CartLine, CartUpdate},
    checkout::models::CartChange,
};

/// Cart Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartResponse {
    /// Lines in the order they were first added
    pub lines: Vec<CartLineResponse>,

    /// Sum of line totals in minor currency units
    pub subtotal: u64,

    /// Total number of units across all lines
    pub item_count: u64,
}

impl TryFrom<&Cart> for CartResponse {
    type Error = CartError;

    fn try_from(cart: &Cart) -> Result<Self, Self::Error> {
        let totals = cart.totals()?;

        Ok(Self {
            lines: cart
                .lines()
                .iter()
                .map(CartLineResponse::try_from)
                .collect::<Result<_, _>>()?,
            subtotal: totals.subtotal,
            item_count: totals.item_count,
        })
    }
}

/// Cart Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartLineResponse {
    pub variant_uuid: Uuid,
    pub product_uuid: Uuid,

    /// Unit price in minor currency units
    pub unit_price: u64,

    pub quantity: u64,

    /// Stock seen when the line was last changed
    pub available_stock: u64,

    pub line_total: u64,
}

impl TryFrom<&CartLine> for CartLineResponse {
    type Error = CartError;

    fn try_from(line: &CartLine) -> Result<Self, Self::Error> {
        Ok(Self {
            variant_uuid: line.variant_uuid.into_uuid(),
            product_uuid: line.product_uuid.into_uuid(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            available_stock: line.available_stock,
            line_total: line.line_total().ok_or(CartError::TotalOverflow)?,
        })
    }
}

/// What a cart mutation did to the affected line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CartOutcome {
    Updated,
    StockLimited,
    Removed,
}

/// Cart Change Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CartChangeResponse {
    pub cart: CartResponse,

    pub outcome: CartOutcome,

    /// Shown to the shopper when less was added than asked for
    pub notice: Option<String>,
}

impl TryFrom<CartChange> for CartChangeResponse {
    type Error = CartError;

    fn try_from(change: CartChange) -> Result<Self, Self::Error> {
        let (outcome, notice) = match change.update {
            CartUpdate::Updated { .. } => (CartOutcome::Updated, None),
            CartUpdate::StockLimited { available, .. } => (
                CartOutcome::StockLimited,
                Some(format!("only {available} available")),
            ),
            CartUpdate::Removed => (CartOutcome::Removed, None),
        };

        Ok(Self {
            cart: CartResponse::try_from(&change.cart)?,
            outcome,
            notice,
        })
    }
}

/// Add Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AddCartItemRequest {
    pub variant_uuid: Uuid,

    /// Units to add; at least 1
    pub quantity: u64,
}

/// Update Cart Item Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct UpdateCartItemRequest {
    /// New quantity; zero or less removes the line
    pub quantity: i64,
}

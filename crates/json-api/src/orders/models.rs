//! Order request and response bodies.

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::domain::{
    checkout::{CheckoutError, models::Confirmation},
    orders::models::{Order, OrderLine, ShippingAddress},
};

/// Shipping Address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub(crate) struct ShippingAddressBody {
    pub recipient: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,

    /// ISO 3166-1 alpha-2 country code
    pub country: String,
}

impl From<ShippingAddressBody> for ShippingAddress {
    fn from(body: ShippingAddressBody) -> Self {
        Self {
            recipient: body.recipient,
            line1: body.line1,
            line2: body.line2.filter(|line| !line.trim().is_empty()),
            city: body.city,
            postal_code: body.postal_code,
            country: body.country,
        }
    }
}

impl From<ShippingAddress> for ShippingAddressBody {
    fn from(address: ShippingAddress) -> Self {
        Self {
            recipient: address.recipient,
            line1: address.line1,
            line2: address.line2,
            city: address.city,
            postal_code: address.postal_code,
            country: address.country,
        }
    }
}

impl ShippingAddressBody {
    /// Names of required fields that are blank.
    pub(crate) fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("recipient", &self.recipient),
            ("line1", &self.line1),
            ("city", &self.city),
            ("postal_code", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// Order Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderResponse {
    pub uuid: Uuid,

    /// One of pending, confirmed, processing, shipped, delivered, cancelled
    pub status: String,

    /// One of pending, paid, failed, refunded
    pub payment_status: String,

    pub lines: Vec<OrderLineResponse>,
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
    pub currency: String,
    pub payment_reference: Option<String>,
    pub shipping_address: ShippingAddressBody,
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<Order> for OrderResponse {
    type Error = CheckoutError;

    fn try_from(order: Order) -> Result<Self, Self::Error> {
        Ok(Self {
            uuid: order.uuid.into_uuid(),
            status: order.status.to_string(),
            payment_status: order.payment_status.to_string(),
            lines: order
                .lines
                .iter()
                .map(OrderLineResponse::try_from)
                .collect::<Result<_, _>>()?,
            subtotal: order.subtotal,
            shipping: order.shipping,
            total: order.total,
            currency: order.currency,
            payment_reference: order.payment_reference.map(|reference| reference.to_string()),
            shipping_address: order.shipping_address.into(),
            paid_at: order.paid_at.map(|paid_at| paid_at.to_string()),
            created_at: order.created_at.to_string(),
            updated_at: order.updated_at.to_string(),
        })
    }
}

/// Order Line Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct OrderLineResponse {
    pub variant_uuid: Uuid,
    pub product_uuid: Uuid,
    pub quantity: u64,

    /// Unit price frozen when the order was placed
    pub unit_price: u64,

    pub line_total: u64,
}

impl TryFrom<&OrderLine> for OrderLineResponse {
    type Error = CheckoutError;

    fn try_from(line: &OrderLine) -> Result<Self, Self::Error> {
        Ok(Self {
            variant_uuid: line.variant_uuid.into_uuid(),
            product_uuid: line.product_uuid.into_uuid(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total().ok_or(CheckoutError::TotalOverflow)?,
        })
    }
}

/// Checkout Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct CheckoutRequest {
    pub shipping_address: ShippingAddressBody,
}

/// Confirm Order Request
///
/// Sent by the client after the gateway redirects back.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmOrderRequest {
    /// Gateway payment reference
    pub reference: String,
}

/// How a confirmation request was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ConfirmationOutcomeBody {
    /// Payment verified now; stock taken
    Confirmed,

    /// The order had already been settled
    AlreadyReconciled,
}

/// Confirmation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmationResponse {
    pub outcome: ConfirmationOutcomeBody,
    pub order: OrderResponse,
}

impl TryFrom<Confirmation> for ConfirmationResponse {
    type Error = CheckoutError;

    fn try_from(confirmation: Confirmation) -> Result<Self, Self::Error> {
        let outcome = match confirmation {
            Confirmation::Confirmed(_) => ConfirmationOutcomeBody::Confirmed,
            Confirmation::AlreadyReconciled(_) => ConfirmationOutcomeBody::AlreadyReconciled,
        };

        Ok(Self {
            outcome,
            order: confirmation.into_order().try_into()?,
        })
    }
}

//! Order Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use thiserror::Error;

use crate::{
    auth::models::UserUuid,
    domain::{
        inventory::models::{ProductUuid, VariantUuid},
        payments::models::PaymentReference,
    },
    uuids::TypedUuid,
};

/// Order UUID
pub type OrderUuid = TypedUuid<Order>;

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Refunded,
}

#[derive(Debug, Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(String);

impl OrderStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// One line of an order, priced at the moment the order was built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub variant_uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub quantity: u64,
    pub unit_price: u64,
}

impl OrderLine {
    /// `unit_price * quantity`, or `None` when that does not fit in a `u64`.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub uuid: OrderUuid,
    pub user_uuid: UserUuid,
    pub lines: Vec<OrderLine>,
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
    pub currency: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<PaymentReference>,
    pub shipping_address: ShippingAddress,
    pub paid_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Whether `reference` may settle this order: either no reference has been
    /// recorded yet, or it is the same one.
    #[must_use]
    pub fn accepts_reference(&self, reference: &PaymentReference) -> bool {
        self.payment_reference
            .as_ref()
            .is_none_or(|stored| stored == reference)
    }
}

/// New Order Model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub uuid: OrderUuid,
    pub lines: Vec<OrderLine>,
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
    pub currency: String,
    pub shipping_address: ShippingAddress,
}

/// Result of a conditional payment status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentTransition {
    /// The update was applied; the order is returned in its new state.
    Applied(Order),

    /// The order was no longer eligible; it is returned as currently stored.
    Unchanged(Order),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_round_trip_through_their_storage_names() -> Result<(), UnknownStatus> {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Confirmed,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>()?, status);
        }

        for status in [
            PaymentStatus::Pending,
            PaymentStatus::Paid,
            PaymentStatus::Failed,
            PaymentStatus::Refunded,
        ] {
            assert_eq!(status.as_str().parse::<PaymentStatus>()?, status);
        }

        Ok(())
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!("settled".parse::<PaymentStatus>().is_err());
        assert!("PENDING".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn line_total_multiplies_frozen_price() {
        let line = OrderLine {
            variant_uuid: VariantUuid::new(),
            product_uuid: ProductUuid::new(),
            quantity: 3,
            unit_price: 12_50,
        };

        assert_eq!(line.line_total(), Some(37_50));

        let huge = OrderLine {
            quantity: 2,
            unit_price: u64::MAX,
            ..line
        };

        assert_eq!(huge.line_total(), None);
    }
}

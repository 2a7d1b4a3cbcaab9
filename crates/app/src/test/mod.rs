//! Shared test infrastructure.

mod db;

pub(crate) use context::TestContext;
pub(crate) use memory::MemoryStore;

use crate::domain::orders::models::ShippingAddress;

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        recipient: "Ada Lovelace".to_string(),
        line1: "12 Analytical Row".to_string(),
        line2: None,
        city: "London".to_string(),
        postal_code: "N1 9GU".to_string(),
        country: "GB".to_string(),
    }
}

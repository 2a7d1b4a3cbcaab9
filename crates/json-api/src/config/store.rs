//! Store Config

use clap::Args;
use storefront_app::{context::StoreSettings, domain::orders::pricing::FlatRateShipping};

/// Currency and shipping settings applied to new orders.
#[derive(Debug, Args)]
pub struct StoreConfig {
    /// ISO 4217 currency code orders are priced in
    #[arg(long = "store-currency", env = "STORE_CURRENCY", default_value = "GBP")]
    pub currency: String,

    /// Flat shipping charge in minor currency units
    #[arg(long, env = "SHIPPING_FLAT_RATE", default_value_t = 0_u64)]
    pub shipping_flat_rate: u64,

    /// Subtotal at or above which shipping is free
    #[arg(long, env = "FREE_SHIPPING_THRESHOLD")]
    pub free_shipping_threshold: Option<u64>,
}

impl StoreConfig {
    /// Store settings for the application context.
    #[must_use]
    pub fn settings(&self) -> StoreSettings {
        StoreSettings {
            currency: self.currency.trim().to_ascii_uppercase(),
            shipping: FlatRateShipping {
                rate: self.shipping_flat_rate,
                free_over: self.free_shipping_threshold,
            },
        }
    }
}

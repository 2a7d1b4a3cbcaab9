//! Payment Gateway Config

use std::time::Duration;

use clap::Args;
use storefront_app::domain::payments::GatewayConfig;

/// Payment gateway verification settings.
#[derive(Debug, Args)]
pub struct PaymentGatewayConfig {
    /// Gateway payment verification endpoint
    #[arg(long, env = "PAYMENT_GATEWAY_URL")]
    pub payment_gateway_url: String,

    /// Gateway API key, sent as a bearer token
    #[arg(long, env = "PAYMENT_GATEWAY_API_KEY", hide_env_values = true)]
    pub payment_gateway_api_key: String,

    /// Verification call timeout in milliseconds
    #[arg(long, env = "PAYMENT_GATEWAY_TIMEOUT_MS", default_value_t = 10_000_u64)]
    pub payment_gateway_timeout_ms: u64,
}

impl PaymentGatewayConfig {
    /// Verification call timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.payment_gateway_timeout_ms)
    }

    /// Client settings for the application's gateway.
    #[must_use]
    pub fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            url: self.payment_gateway_url.clone(),
            api_key: self.payment_gateway_api_key.clone(),
            timeout: self.timeout(),
        }
    }
}

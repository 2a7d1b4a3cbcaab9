//! Server configuration module

use clap::Parser;

use crate::config::{
    db::DatabaseConfig,
    gateway::PaymentGatewayConfig,
    observability::{LoggingConfig, ObservabilityConfig},
    server::ServerRuntimeConfig,
    store::StoreConfig,
};

pub(crate) mod db;
pub(crate) mod gateway;
pub(crate) mod observability;
pub(crate) mod server;
pub(crate) mod store;

/// Storefront JSON API Server configuration
#[derive(Debug, Parser)]
#[command(name = "storefront-json", about = "Storefront JSON API Server", long_about = None)]
pub struct ServerConfig {
    /// Server network settings.
    #[command(flatten)]
    pub server: ServerRuntimeConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Request observability settings.
    #[command(flatten)]
    pub observability: ObservabilityConfig,

    /// Application database settings.
    #[command(flatten)]
    pub database: DatabaseConfig,

    /// Payment gateway settings.
    #[command(flatten)]
    pub gateway: PaymentGatewayConfig,

    /// Currency and shipping settings.
    #[command(flatten)]
    pub store: StoreConfig,
}

impl ServerConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Get the socket address for binding
    #[must_use]
    pub fn socket_addr(&self) -> String {
        self.server.socket_addr()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use testresult::TestResult;

    use super::*;

    const REQUIRED: [&str; 7] = [
        "storefront-json",
        "--database-url",
        "postgres://localhost/storefront",
        "--payment-gateway-url",
        "https://gateway.test/verify",
        "--payment-gateway-api-key",
        "secret",
    ];

    #[test]
    fn defaults_apply_when_only_required_values_are_given() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED)?;

        assert_eq!(config.socket_addr(), "0.0.0.0:8698");
        assert_eq!(config.gateway.timeout(), Duration::from_secs(10));
        assert_eq!(config.store.currency, "GBP");
        assert_eq!(config.store.settings().shipping.rate, 0);
        assert_eq!(config.store.settings().shipping.free_over, None);

        Ok(())
    }

    #[test]
    fn store_and_gateway_settings_are_parsed() -> TestResult {
        let config = ServerConfig::try_parse_from(REQUIRED.into_iter().chain([
            "--payment-gateway-timeout-ms",
            "2500",
            "--store-currency",
            "eur",
            "--shipping-flat-rate",
            "495",
            "--free-shipping-threshold",
            "5000",
        ]))?;

        let settings = config.store.settings();

        assert_eq!(config.gateway.timeout(), Duration::from_millis(2500));
        assert_eq!(settings.currency, "EUR");
        assert_eq!(settings.shipping.rate, 495);
        assert_eq!(settings.shipping.free_over, Some(5000));

        Ok(())
    }

    #[test]
    fn missing_gateway_url_is_rejected() {
        let result = ServerConfig::try_parse_from([
            "storefront-json",
            "--database-url",
            "postgres://localhost/storefront",
            "--payment-gateway-api-key",
            "secret",
        ]);

        assert!(result.is_err(), "expected a parse error");
    }
}

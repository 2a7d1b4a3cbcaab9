//! App Context

use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use crate::{
    auth::{AuthService, PgAuthService},
    database::{self, Db},
    domain::{
        carts::PgCartsService,
        checkout::{CheckoutService, DefaultCheckoutService},
        inventory::PgInventoryService,
        orders::{PgOrdersService, pricing::FlatRateShipping},
        payments::{GatewayConfig, HttpPaymentGateway},
    },
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to database")]
    Database(#[source] sqlx::Error),
}

/// Store-wide settings applied to every order.
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// ISO 4217 code orders are priced in.
    pub currency: String,

    pub shipping: FlatRateShipping,
}

#[derive(Clone)]
pub struct AppContext {
    pub checkout: Arc<dyn CheckoutService>,
    pub auth: Arc<dyn AuthService>,
}

impl AppContext {
    /// Build application context from a database URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing a database connection fails.
    pub async fn from_database_url(
        url: &str,
        gateway: GatewayConfig,
        store: StoreSettings,
    ) -> Result<Self, AppInitError> {
        let pool = database::connect(url)
            .await
            .map_err(AppInitError::Database)?;

        Ok(Self::from_pool(pool, gateway, store))
    }

    /// Wire the Postgres-backed services and the HTTP payment gateway.
    #[must_use]
    pub fn from_pool(pool: PgPool, gateway: GatewayConfig, store: StoreSettings) -> Self {
        let db = Db::new(pool.clone());

        let checkout = DefaultCheckoutService::new(
            Arc::new(PgCartsService::new(db.clone())),
            Arc::new(PgOrdersService::new(db.clone())),
            Arc::new(PgInventoryService::new(db)),
            Arc::new(HttpPaymentGateway::new(gateway)),
            Arc::new(store.shipping),
            store.currency,
        );

        Self {
            checkout: Arc::new(checkout),
            auth: Arc::new(PgAuthService::new(pool)),
        }
    }
}

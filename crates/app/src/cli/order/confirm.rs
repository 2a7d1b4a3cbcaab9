use std::time::Duration;

use clap::Args;
use storefront_app::{
    auth::models::UserUuid,
    context::{AppContext, StoreSettings},
    domain::{
        checkout::models::Confirmation,
        orders::{models::OrderUuid, pricing::FlatRateShipping},
        payments::{GatewayConfig, models::PaymentReference},
    },
};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct ConfirmOrderArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Payment gateway verification endpoint
    #[arg(long, env = "PAYMENT_GATEWAY_URL")]
    gateway_url: String,

    /// Payment gateway API key
    #[arg(long, env = "PAYMENT_GATEWAY_API_KEY", hide_env_values = true)]
    gateway_api_key: String,

    /// Payment gateway timeout in milliseconds
    #[arg(long, env = "PAYMENT_GATEWAY_TIMEOUT_MS", default_value_t = 10_000)]
    gateway_timeout_ms: u64,

    /// Owner of the order
    #[arg(long)]
    user_uuid: Uuid,

    /// Order to confirm
    #[arg(long)]
    order_uuid: Uuid,

    /// Gateway payment reference
    #[arg(long)]
    reference: String,
}

pub(crate) async fn run(args: ConfirmOrderArgs) -> Result<(), String> {
    let reference = PaymentReference::new(&args.reference).map_err(|error| error.to_string())?;

    // Confirmation never prices an order, so store settings are irrelevant here.
    let app = AppContext::from_database_url(
        &args.database_url,
        GatewayConfig {
            url: args.gateway_url,
            api_key: args.gateway_api_key,
            timeout: Duration::from_millis(args.gateway_timeout_ms),
        },
        StoreSettings {
            currency: String::new(),
            shipping: FlatRateShipping::default(),
        },
    )
    .await
    .map_err(|error| format!("failed to initialise application: {error}"))?;

    let confirmation = app
        .checkout
        .confirm_order(
            UserUuid::from_uuid(args.user_uuid),
            OrderUuid::from_uuid(args.order_uuid),
            reference,
        )
        .await
        .map_err(|error| format!("failed to confirm order: {error}"))?;

    let outcome = match confirmation {
        Confirmation::Confirmed(_) => "confirmed",
        Confirmation::AlreadyReconciled(_) => "already_reconciled",
    };

    let order = confirmation.order();

    println!("outcome: {outcome}");
    println!("order_uuid: {}", order.uuid);
    println!("status: {}", order.status);
    println!("payment_status: {}", order.payment_status);

    Ok(())
}

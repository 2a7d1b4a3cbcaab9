//! Confirm Order Handler

use std::sync::Arc;

use salvo::{
    http::header::RETRY_AFTER,
    oapi::extract::{JsonBody, PathParam},
    prelude::*,
};
use storefront_app::domain::{
    checkout::{CheckoutError, models::Confirmation},
    payments::models::PaymentReference,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    errors::into_status_error,
    extensions::*,
    observability::{ConfirmationOutcome, observe_confirmation},
    orders::models::{ConfirmOrderRequest, ConfirmationResponse},
    state::State,
};

const RETRY_AFTER_SECONDS: &str = "5";

/// Confirm Order Handler
///
/// Called when the gateway redirects the shopper back. Verifies the payment
/// and reconciles the order. Safe to repeat: a settled order is reported as
/// already reconciled, and stock is only ever taken once.
#[endpoint(
    tags("orders"),
    summary = "Confirm Order Payment",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Order confirmed or already reconciled"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::PAYMENT_REQUIRED, description = "Payment failed"),
        (status_code = StatusCode::NOT_FOUND, description = "Order not found"),
        (status_code = StatusCode::CONFLICT, description = "Reference or amount mismatch, or insufficient stock"),
        (status_code = StatusCode::SERVICE_UNAVAILABLE, description = "Payment gateway unavailable; retry"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "orders.confirm",
    skip(order, json, depot, res),
    fields(user_uuid = tracing::field::Empty, order_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    order: PathParam<Uuid>,
    json: JsonBody<ConfirmOrderRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<ConfirmationResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let order = order.into_inner();
    let reference = PaymentReference::new(json.into_inner().reference)
        .or_400("Invalid payment reference")?;

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("order_uuid", tracing::field::display(order));

    let result = state
        .app
        .checkout
        .confirm_order(user, order.into(), reference)
        .await;

    observe_confirmation(outcome(&result));

    match result {
        Ok(confirmation) => {
            info!(
                payment_status = %confirmation.order().payment_status,
                already_reconciled = matches!(confirmation, Confirmation::AlreadyReconciled(_)),
                "order confirmation handled"
            );

            Ok(Json(confirmation.try_into().map_err(into_status_error)?))
        }
        Err(error) => {
            if error.is_retryable() {
                res.add_header(RETRY_AFTER, RETRY_AFTER_SECONDS, true)
                    .or_500("failed to set retry-after header")?;
            }

            Err(into_status_error(error))
        }
    }
}

fn outcome(result: &Result<Confirmation, CheckoutError>) -> ConfirmationOutcome {
    match result {
        Ok(Confirmation::Confirmed(_)) => ConfirmationOutcome::Confirmed,
        Ok(Confirmation::AlreadyReconciled(_)) => ConfirmationOutcome::AlreadyReconciled,
        Err(CheckoutError::GatewayRejected { .. }) => ConfirmationOutcome::Rejected,
        Err(error) if error.is_retryable() => ConfirmationOutcome::Retryable,
        Err(_) => ConfirmationOutcome::Failed,
    }
}

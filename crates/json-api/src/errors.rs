//! Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use storefront_app::domain::checkout::CheckoutError;

pub(crate) fn into_status_error(error: impl Into<CheckoutError>) -> StatusError {
    match error.into() {
        CheckoutError::EmptyCart => StatusError::bad_request().brief("Cart is empty"),
        CheckoutError::InvalidQuantity => {
            StatusError::bad_request().brief("Quantity must be at least 1")
        }
        CheckoutError::TotalOverflow => StatusError::bad_request()
            .brief("Order total is too large")
            .detail("reduce quantities and try again"),
        CheckoutError::InsufficientStock { variant, available } => StatusError::conflict()
            .brief("Insufficient stock")
            .detail(format!("only {available} of variant {variant} available")),
        CheckoutError::NotFound => StatusError::not_found().brief("Cart item not found"),
        CheckoutError::OrderNotFound => StatusError::not_found().brief("Order not found"),
        CheckoutError::VariantNotFound => StatusError::not_found().brief("Variant not found"),
        CheckoutError::ReferenceMismatch => StatusError::conflict()
            .brief("Payment reference does not belong to this order"),
        CheckoutError::AmountMismatch => {
            warn!("verified payment amount differs from order total");

            StatusError::conflict().brief("Payment does not match the order total")
        }
        CheckoutError::Conflict => StatusError::conflict()
            .brief("Order is being updated")
            .detail("retry the request"),
        CheckoutError::TransportFailure { detail } => {
            warn!("payment gateway unavailable: {detail}");

            StatusError::service_unavailable()
                .brief("Payment gateway unavailable")
                .detail("retry the request later")
        }
        CheckoutError::GatewayRejected { reason } => StatusError::payment_required()
            .brief("Payment failed")
            .detail(reason),
        CheckoutError::Carts(source) => {
            error!("cart storage failed: {source}");

            StatusError::internal_server_error()
        }
        CheckoutError::Orders(source) => {
            error!("order storage failed: {source}");

            StatusError::internal_server_error()
        }
        CheckoutError::Inventory(source) => {
            error!("inventory storage failed: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use storefront_app::domain::{
        carts::CartsServiceError, inventory::models::VariantUuid, orders::OrdersServiceError,
    };

    use super::*;

    fn code(error: CheckoutError) -> StatusCode {
        into_status_error(error).code
    }

    #[test]
    fn validation_errors_are_client_errors() {
        assert_eq!(code(CheckoutError::EmptyCart), StatusCode::BAD_REQUEST);
        assert_eq!(code(CheckoutError::InvalidQuantity), StatusCode::BAD_REQUEST);
        assert_eq!(code(CheckoutError::TotalOverflow), StatusCode::BAD_REQUEST);
        assert_eq!(code(CheckoutError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(code(CheckoutError::OrderNotFound), StatusCode::NOT_FOUND);
        assert_eq!(code(CheckoutError::VariantNotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn state_conflicts_are_409() {
        let short = CheckoutError::InsufficientStock {
            variant: VariantUuid::new(),
            available: 2,
        };

        assert_eq!(code(short), StatusCode::CONFLICT);
        assert_eq!(code(CheckoutError::ReferenceMismatch), StatusCode::CONFLICT);
        assert_eq!(code(CheckoutError::AmountMismatch), StatusCode::CONFLICT);
        assert_eq!(code(CheckoutError::Conflict), StatusCode::CONFLICT);
    }

    #[test]
    fn insufficient_stock_reports_what_is_left() {
        let status = into_status_error(CheckoutError::InsufficientStock {
            variant: VariantUuid::new(),
            available: 2,
        });

        assert!(
            status.detail.as_deref().is_some_and(|detail| detail.starts_with("only 2 ")),
            "unexpected detail: {:?}",
            status.detail
        );
    }

    #[test]
    fn gateway_outcomes_map_to_retry_and_payment_failed() {
        let transport = CheckoutError::TransportFailure {
            detail: "timed out".to_string(),
        };
        let rejected = CheckoutError::GatewayRejected {
            reason: "card declined".to_string(),
        };

        assert_eq!(code(transport), StatusCode::SERVICE_UNAVAILABLE);

        let status = into_status_error(rejected);

        assert_eq!(status.code, StatusCode::PAYMENT_REQUIRED);
        assert_eq!(status.detail.as_deref(), Some("card declined"));
    }

    #[test]
    fn storage_errors_are_500() {
        assert_eq!(
            code(CheckoutError::Carts(CartsServiceError::InvalidData)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            code(CheckoutError::Orders(OrdersServiceError::AlreadyExists)),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}

//! Checkout Handler

use std::sync::Arc;

use salvo::{http::header::LOCATION, oapi::extract::JsonBody, prelude::*};
use tracing::info;

use crate::{
    errors::into_status_error,
    extensions::*,
    orders::models::{CheckoutRequest, OrderResponse},
    state::State,
};

/// Checkout Handler
///
/// Turns the cart into a pending order and takes the ordered lines out of the
/// cart. The client then sends the shopper to the payment gateway for the
/// returned order.
#[endpoint(
    tags("checkout"),
    summary = "Check Out",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::CREATED, description = "Order created"),
        (status_code = StatusCode::BAD_REQUEST, description = "Cart is empty or address incomplete"),
        (status_code = StatusCode::CONFLICT, description = "Insufficient stock"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<CheckoutRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<OrderResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let address = json.into_inner().shipping_address;

    let blank = address.blank_fields();

    if !blank.is_empty() {
        return Err(StatusError::bad_request()
            .brief("Incomplete shipping address")
            .detail(format!("missing: {}", blank.join(", "))));
    }

    let order = state
        .app
        .checkout
        .checkout(user, address.into())
        .await
        .map_err(into_status_error)?;

    info!(order_uuid = %order.uuid, total = order.total, "checked out");

    res.add_header(LOCATION, format!("/orders/{}", order.uuid), true)
        .or_500("failed to set location header")?
        .status_code(StatusCode::CREATED);

    Ok(Json(order.try_into().map_err(into_status_error)?))
}

#[cfg(test)]
mod tests {
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use storefront_app::domain::{
        checkout::{CheckoutError, MockCheckoutService},
        inventory::models::VariantUuid,
        orders::models::OrderUuid,
    };
    use testresult::TestResult;

    use crate::test_helpers::{
        TEST_USER_UUID, checkout_service, make_order, shipping_address, shipping_address_json,
    };

    use super::*;

    fn make_service(checkout: MockCheckoutService) -> Service {
        checkout_service(checkout, Router::with_path("checkout").post(handler))
    }

    #[tokio::test]
    async fn creates_pending_order() -> TestResult {
        let uuid = OrderUuid::new();
        let order = make_order(uuid);

        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_checkout()
            .once()
            .withf(|user, address| *user == TEST_USER_UUID && *address == shipping_address())
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::post("http://example.com/checkout")
            .json(&json!({ "shipping_address": shipping_address_json() }))
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));

        let location = res
            .headers()
            .get("location")
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);

        assert_eq!(location, Some(format!("/orders/{uuid}")));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(body.uuid, uuid.into_uuid());
        assert_eq!(body.total, 2000);
        assert_eq!(body.status, "pending");
        assert_eq!(body.payment_status, "pending");
        assert_eq!(body.lines[0].unit_price, 1000);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_returns_400() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout
            .expect_checkout()
            .once()
            .return_once(|_, _| Err(CheckoutError::EmptyCart));

        let res = TestClient::post("http://example.com/checkout")
            .json(&json!({ "shipping_address": shipping_address_json() }))
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }

    #[tokio::test]
    async fn insufficient_stock_returns_409() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_checkout().once().return_once(|_, _| {
            Err(CheckoutError::InsufficientStock {
                variant: VariantUuid::new(),
                available: 1,
            })
        });

        let res = TestClient::post("http://example.com/checkout")
            .json(&json!({ "shipping_address": shipping_address_json() }))
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));

        Ok(())
    }

    #[tokio::test]
    async fn blank_address_fields_are_rejected_before_the_service() -> TestResult {
        let mut checkout = MockCheckoutService::new();

        checkout.expect_checkout().never();

        let mut address = shipping_address_json();
        address["city"] = json!("  ");

        let res = TestClient::post("http://example.com/checkout")
            .json(&json!({ "shipping_address": address }))
            .send(&make_service(checkout))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));

        Ok(())
    }
}

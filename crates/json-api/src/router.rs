//! App Router

use salvo::Router;

use crate::{auth, carts, checkout, orders};

/// Authenticated storefront routes.
pub(crate) fn app_router() -> Router {
    Router::new()
        .hoop(auth::middleware::handler)
        .push(
            Router::with_path("cart").get(carts::get::handler).push(
                Router::with_path("items")
                    .post(carts::items::create::handler)
                    .push(
                        Router::with_path("{variant}")
                            .put(carts::items::update::handler)
                            .delete(carts::items::delete::handler),
                    ),
            ),
        )
        .push(Router::with_path("checkout").post(checkout::create::handler))
        .push(
            Router::with_path("orders").get(orders::index::handler).push(
                Router::with_path("{order}")
                    .get(orders::get::handler)
                    .push(Router::with_path("confirm").post(orders::confirm::handler)),
            ),
        )
}

#[cfg(test)]
mod tests {
    use salvo::{
        affix_state::inject,
        http::{StatusCode, header::AUTHORIZATION},
        prelude::*,
        test::{ResponseExt, TestClient},
    };
    use storefront_app::{
        auth::{AuthServiceError, MockAuthService},
        domain::{checkout::MockCheckoutService, orders::models::OrderUuid},
    };
    use testresult::TestResult;

    use crate::{
        orders::models::OrderResponse,
        test_helpers::{TEST_USER_UUID, make_order, state_with},
    };

    use super::*;

    fn make_service(checkout: MockCheckoutService, auth: MockAuthService) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(state_with(checkout, auth)))
                .push(app_router()),
        )
    }

    #[tokio::test]
    async fn routes_require_a_session() -> TestResult {
        let mut checkout = MockCheckoutService::new();
        let mut auth = MockAuthService::new();

        checkout.expect_list_orders().never();
        auth.expect_authenticate_bearer()
            .once()
            .return_once(|_| Err(AuthServiceError::NotFound));

        let res = TestClient::get("http://example.com/orders")
            .add_header(AUTHORIZATION, "Bearer stale", true)
            .send(&make_service(checkout, auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::UNAUTHORIZED));

        Ok(())
    }

    #[tokio::test]
    async fn authenticated_user_reaches_their_order() -> TestResult {
        let uuid = OrderUuid::new();
        let order = make_order(uuid);

        let mut checkout = MockCheckoutService::new();
        let mut auth = MockAuthService::new();

        auth.expect_authenticate_bearer()
            .once()
            .withf(|token| token == "session-token")
            .return_once(|_| Ok(TEST_USER_UUID));

        checkout
            .expect_get_order()
            .once()
            .withf(move |user, o| *user == TEST_USER_UUID && *o == uuid)
            .return_once(move |_, _| Ok(order));

        let mut res = TestClient::get(format!("http://example.com/orders/{uuid}"))
            .add_header(AUTHORIZATION, "Bearer session-token", true)
            .send(&make_service(checkout, auth))
            .await;

        assert_eq!(res.status_code, Some(StatusCode::OK));

        let body: OrderResponse = res.take_json().await?;

        assert_eq!(body.uuid, uuid.into_uuid());

        Ok(())
    }
}

//! List Orders Handler

use std::sync::Arc;

use salvo::prelude::*;

use crate::{
    errors::into_status_error, extensions::*, orders::models::OrderResponse, state::State,
};

/// List Orders Handler
///
/// Returns the authenticated user's orders, newest first.
#[endpoint(
    tags("orders"),
    summary = "List Orders",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Orders"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(depot: &mut Depot) -> Result<Json<Vec<OrderResponse>>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;

    let orders = state
        .app
        .checkout
        .list_orders(user)
        .await
        .map_err(into_status_error)?;

    let body: Vec<OrderResponse> = orders
        .into_iter()
        .map(OrderResponse::try_from)
        .collect::<Result<_, _>>()
        .map_err(into_status_error)?;

    Ok(Json(body))
}

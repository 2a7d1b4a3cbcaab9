//! Add Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    carts::models::{AddCartItemRequest, CartChangeResponse},
    errors::into_status_error,
    extensions::*,
    state::State,
};

/// Add Cart Item Handler
///
/// Adds units of a variant, merging with an existing line. When stock is
/// short the line is clamped and the response carries a notice.
#[endpoint(
    tags("cart"),
    summary = "Add Item to Cart",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart updated"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::NOT_FOUND, description = "Variant not found"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<AddCartItemRequest>,
    depot: &mut Depot,
) -> Result<Json<CartChangeResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let request = json.into_inner();

    let change = state
        .app
        .checkout
        .add_to_cart(user, request.variant_uuid.into(), request.quantity)
        .await
        .map_err(into_status_error)?;

    Ok(Json(change.try_into().map_err(into_status_error)?))
}

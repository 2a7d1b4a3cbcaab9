//! Remove Cart Item Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};
use uuid::Uuid;

use crate::{
    carts::models::CartResponse, errors::into_status_error, extensions::*, state::State,
};

/// Remove Cart Item Handler
///
/// Removing a variant that is not in the cart succeeds without change.
#[endpoint(
    tags("cart"),
    summary = "Remove Cart Item",
    security(("bearer_auth" = [])),
    responses(
        (status_code = StatusCode::OK, description = "Cart after removal"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
#[tracing::instrument(
    name = "cart.items.delete",
    skip(variant, depot),
    fields(user_uuid = tracing::field::Empty, variant_uuid = tracing::field::Empty),
    err
)]
pub(crate) async fn handler(
    variant: PathParam<Uuid>,
    depot: &mut Depot,
) -> Result<Json<CartResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let user = depot.user_uuid_or_401()?;
    let variant = variant.into_inner();

    let span = tracing::Span::current();

    span.record("user_uuid", tracing::field::display(user));
    span.record("variant_uuid", tracing::field::display(variant));

    let cart = state
        .app
        .checkout
        .remove_from_cart(user, variant.into())
        .await
        .map_err(into_status_error)?;

    Ok(Json(CartResponse::try_from(&cart).map_err(into_status_error)?))
}

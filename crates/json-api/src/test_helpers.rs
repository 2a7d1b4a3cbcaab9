//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use salvo::{affix_state::inject, prelude::*};
use serde_json::{Value, json};
use uuid::Uuid;

use storefront_app::{
    auth::{MockAuthService, models::UserUuid},
    context::AppContext,
    domain::{
        carts::models::{Cart, CartError},
        checkout::MockCheckoutService,
        inventory::models::{ProductUuid, Variant, VariantUuid},
        orders::models::{
            Order, OrderLine, OrderStatus, OrderUuid, PaymentStatus, ShippingAddress,
        },
    },
};

use crate::{extensions::*, state::State};

pub(crate) const TEST_USER_UUID: UserUuid = UserUuid::from_uuid(Uuid::nil());

#[salvo::handler]
pub(crate) async fn inject_user(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    depot.insert_user_uuid(TEST_USER_UUID);
    ctrl.call_next(req, depot, res).await;
}

pub(crate) fn state_with(checkout: MockCheckoutService, auth: MockAuthService) -> Arc<State> {
    State::from_app_context(AppContext {
        checkout: Arc::new(checkout),
        auth: Arc::new(auth),
    })
}

pub(crate) fn state_with_auth(auth: MockAuthService) -> Arc<State> {
    state_with(MockCheckoutService::new(), auth)
}

/// A service that routes `route` as [`TEST_USER_UUID`], without a token.
pub(crate) fn checkout_service(checkout: MockCheckoutService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with(checkout, MockAuthService::new())))
            .hoop(inject_user)
            .push(route),
    )
}

pub(crate) fn make_variant(price: u64, stock: u64) -> Variant {
    Variant {
        uuid: VariantUuid::new(),
        product_uuid: ProductUuid::new(),
        price,
        stock,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_cart(variant: &Variant, quantity: u64) -> Result<Cart, CartError> {
    let mut cart = Cart::new();

    cart.add_item(variant, quantity)?;

    Ok(cart)
}

pub(crate) fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        recipient: "Ada Lovelace".to_string(),
        line1: "12 St James's Square".to_string(),
        line2: None,
        city: "London".to_string(),
        postal_code: "SW1Y 4JH".to_string(),
        country: "GB".to_string(),
    }
}

pub(crate) fn shipping_address_json() -> Value {
    json!({
        "recipient": "Ada Lovelace",
        "line1": "12 St James's Square",
        "city": "London",
        "postal_code": "SW1Y 4JH",
        "country": "GB",
    })
}

/// A pending order for two units at 1000.
pub(crate) fn make_order(uuid: OrderUuid) -> Order {
    Order {
        uuid,
        user_uuid: TEST_USER_UUID,
        lines: vec![OrderLine {
            variant_uuid: VariantUuid::new(),
            product_uuid: ProductUuid::new(),
            quantity: 2,
            unit_price: 1000,
        }],
        subtotal: 2000,
        shipping: 0,
        total: 2000,
        currency: "GBP".to_string(),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_reference: None,
        shipping_address: shipping_address(),
        paid_at: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

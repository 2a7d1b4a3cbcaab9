//! Order Builder

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    auth::models::UserUuid,
    domain::{
        carts::models::Cart,
        checkout::errors::CheckoutError,
        inventory::InventoryService,
        orders::{
            OrdersService,
            models::{NewOrder, Order, OrderLine, OrderUuid, ShippingAddress},
            pricing::PricingPolicy,
        },
    },
};

/// Turns a cart into a persisted, pending order.
#[derive(Clone)]
pub struct OrderBuilder {
    orders: Arc<dyn OrdersService>,
    inventory: Arc<dyn InventoryService>,
    pricing: Arc<dyn PricingPolicy>,
    currency: String,
}

impl std::fmt::Debug for OrderBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBuilder")
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl OrderBuilder {
    #[must_use]
    pub fn new(
        orders: Arc<dyn OrdersService>,
        inventory: Arc<dyn InventoryService>,
        pricing: Arc<dyn PricingPolicy>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            orders,
            inventory,
            pricing,
            currency: currency.into(),
        }
    }

    /// Build and persist an order for everything in `cart`.
    ///
    /// Every line is checked against live stock before anything is written;
    /// the first short line fails the whole build. Prices are frozen from the
    /// cart. The cart itself is left untouched.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::EmptyCart`] for an empty cart,
    /// [`CheckoutError::InsufficientStock`] when a line exceeds live stock,
    /// [`CheckoutError::TotalOverflow`] when the priced total does not fit in
    /// a `u64`, or a storage error.
    pub async fn build_order(
        &self,
        cart: &Cart,
        user: UserUuid,
        shipping_address: ShippingAddress,
    ) -> Result<Order, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for line in cart.lines() {
            let available = self.inventory.read_available(line.variant_uuid).await?;

            if available < line.quantity {
                debug!(
                    %user,
                    variant = %line.variant_uuid,
                    requested = line.quantity,
                    available,
                    "checkout blocked by stock"
                );

                return Err(CheckoutError::InsufficientStock {
                    variant: line.variant_uuid,
                    available,
                });
            }
        }

        let lines: Vec<OrderLine> = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                variant_uuid: line.variant_uuid,
                product_uuid: line.product_uuid,
                quantity: line.quantity,
                unit_price: line.unit_price,
            })
            .collect();

        let quote = self.pricing.quote(&lines)?;

        let order = self
            .orders
            .create_order(
                user,
                NewOrder {
                    uuid: OrderUuid::new(),
                    lines,
                    subtotal: quote.subtotal,
                    shipping: quote.shipping,
                    total: quote.total,
                    currency: self.currency.clone(),
                    shipping_address,
                },
            )
            .await?;

        info!(order = %order.uuid, %user, total = order.total, "order built");

        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::orders::{
            models::{OrderStatus, PaymentStatus},
            pricing::FlatRateShipping,
        },
        test::{MemoryStore, shipping_address},
    };

    use super::*;

    fn builder(store: &Arc<MemoryStore>, pricing: FlatRateShipping) -> OrderBuilder {
        OrderBuilder::new(store.clone(), store.clone(), Arc::new(pricing), "GBP")
    }

    #[tokio::test]
    async fn builds_pending_order_with_frozen_prices() -> TestResult {
        let store = MemoryStore::new();
        let shirt = store.seed_variant(1000, 5);
        let user = UserUuid::new();

        let mut cart = Cart::new();
        cart.add_item(&shirt, 2)?;

        let order = builder(&store, FlatRateShipping::default())
            .build_order(&cart, user, shipping_address())
            .await?;

        assert_eq!(order.total, 2000);
        assert_eq!(order.subtotal, 2000);
        assert_eq!(order.currency, "GBP");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines[0].unit_price, 1000);
        assert_eq!(order.lines[0].quantity, 2);
        assert_eq!(store.stock(shirt.uuid), 5, "building must not touch stock");

        Ok(())
    }

    #[tokio::test]
    async fn adds_shipping_from_pricing_policy() -> TestResult {
        let store = MemoryStore::new();
        let shirt = store.seed_variant(1000, 5);

        let mut cart = Cart::new();
        cart.add_item(&shirt, 1)?;

        let order = builder(
            &store,
            FlatRateShipping {
                rate: 495,
                free_over: Some(5000),
            },
        )
        .build_order(&cart, UserUuid::new(), shipping_address())
        .await?;

        assert_eq!(order.shipping, 495);
        assert_eq!(order.total, 1495);

        Ok(())
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let store = MemoryStore::new();

        let result = builder(&store, FlatRateShipping::default())
            .build_order(&Cart::new(), UserUuid::new(), shipping_address())
            .await;

        assert!(
            matches!(result, Err(CheckoutError::EmptyCart)),
            "expected EmptyCart, got {result:?}"
        );
        assert_eq!(store.order_count(), 0);
    }

    #[tokio::test]
    async fn any_short_line_fails_the_whole_build() -> TestResult {
        let store = MemoryStore::new();
        let shirt = store.seed_variant(1000, 5);
        let socks = store.seed_variant(300, 3);

        let mut cart = Cart::new();
        cart.add_item(&shirt, 2)?;
        cart.add_item(&socks, 3)?;

        // Someone else bought socks after they were added.
        store.set_stock(socks.uuid, 1);

        let result = builder(&store, FlatRateShipping::default())
            .build_order(&cart, UserUuid::new(), shipping_address())
            .await;

        assert!(
            matches!(
                result,
                Err(CheckoutError::InsufficientStock { variant, available: 1 }) if variant == socks.uuid
            ),
            "expected InsufficientStock for socks, got {result:?}"
        );
        assert_eq!(store.order_count(), 0);
        assert_eq!(store.stock(shirt.uuid), 5);
        assert_eq!(store.stock(socks.uuid), 1);

        Ok(())
    }

    #[tokio::test]
    async fn overflowing_total_writes_nothing() -> TestResult {
        let store = MemoryStore::new();
        let pricey = store.seed_variant(u64::MAX - 10, 1);

        let mut cart = Cart::new();
        cart.add_item(&pricey, 1)?;

        let result = builder(
            &store,
            FlatRateShipping {
                rate: 495,
                free_over: None,
            },
        )
        .build_order(&cart, UserUuid::new(), shipping_address())
        .await;

        assert!(
            matches!(result, Err(CheckoutError::TotalOverflow)),
            "expected TotalOverflow, got {result:?}"
        );
        assert_eq!(store.order_count(), 0);

        Ok(())
    }
}

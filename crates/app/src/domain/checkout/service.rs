//! Checkout service.
//!
//! The boundary presentation code talks to: cart maintenance, checkout and
//! payment confirmation for an authenticated user.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};

use crate::{
    auth::models::UserUuid,
    domain::{
        carts::{CartsService, models::Cart},
        checkout::{
            builder::OrderBuilder,
            errors::CheckoutError,
            models::{CartChange, Confirmation, Reconciliation},
            reconciliation::ReconciliationEngine,
        },
        inventory::{InventoryService, models::VariantUuid},
        orders::{
            OrdersService,
            models::{Order, OrderUuid, PaymentStatus, ShippingAddress},
            pricing::PricingPolicy,
        },
        payments::{PaymentGateway, models::PaymentReference},
    },
};

/// Reported when confirming an order whose payment was rejected earlier.
const ALREADY_REJECTED: &str = "payment was already rejected";

#[derive(Clone)]
pub struct DefaultCheckoutService {
    carts: Arc<dyn CartsService>,
    orders: Arc<dyn OrdersService>,
    inventory: Arc<dyn InventoryService>,
    gateway: Arc<dyn PaymentGateway>,
    builder: OrderBuilder,
    engine: ReconciliationEngine,
}

impl std::fmt::Debug for DefaultCheckoutService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultCheckoutService")
            .field("builder", &self.builder)
            .finish_non_exhaustive()
    }
}

impl DefaultCheckoutService {
    #[must_use]
    pub fn new(
        carts: Arc<dyn CartsService>,
        orders: Arc<dyn OrdersService>,
        inventory: Arc<dyn InventoryService>,
        gateway: Arc<dyn PaymentGateway>,
        pricing: Arc<dyn PricingPolicy>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            builder: OrderBuilder::new(orders.clone(), inventory.clone(), pricing, currency),
            engine: ReconciliationEngine::new(orders.clone(), inventory.clone()),
            carts,
            orders,
            inventory,
            gateway,
        }
    }
}

#[async_trait]
impl CheckoutService for DefaultCheckoutService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CheckoutError> {
        Ok(self.carts.get_cart(user).await?)
    }

    async fn add_to_cart(
        &self,
        user: UserUuid,
        variant: VariantUuid,
        quantity: u64,
    ) -> Result<CartChange, CheckoutError> {
        if quantity == 0 {
            return Err(CheckoutError::InvalidQuantity);
        }

        let variant = self.inventory.get_variant(variant).await?;
        let mut cart = self.carts.get_cart(user).await?;

        let update = cart.add_item(&variant, quantity)?;

        self.carts.save_cart(user, &cart).await?;

        debug!(%user, variant = %variant.uuid, ?update, "cart item added");

        Ok(CartChange { cart, update })
    }

    async fn update_cart_item(
        &self,
        user: UserUuid,
        variant: VariantUuid,
        quantity: i64,
    ) -> Result<CartChange, CheckoutError> {
        let mut cart = self.carts.get_cart(user).await?;

        if cart.line(variant).is_none() {
            return Err(CheckoutError::NotFound);
        }

        if quantity > 0 {
            let live = self.inventory.get_variant(variant).await?;

            cart.refresh(&live);
        }

        let update = cart.update_quantity(variant, quantity)?;

        self.carts.save_cart(user, &cart).await?;

        debug!(%user, %variant, ?update, "cart item updated");

        Ok(CartChange { cart, update })
    }

    async fn remove_from_cart(
        &self,
        user: UserUuid,
        variant: VariantUuid,
    ) -> Result<Cart, CheckoutError> {
        let mut cart = self.carts.get_cart(user).await?;

        if cart.remove_item(variant) {
            self.carts.save_cart(user, &cart).await?;
        }

        Ok(cart)
    }

    async fn checkout(
        &self,
        user: UserUuid,
        shipping_address: ShippingAddress,
    ) -> Result<Order, CheckoutError> {
        let cart = self.carts.get_cart(user).await?;

        let order = self
            .builder
            .build_order(&cart, user, shipping_address)
            .await?;

        if let Err(error) = self.carts.remove_ordered(user, &cart).await {
            warn!(%user, order = %order.uuid, %error, "failed to remove ordered lines from cart");
        }

        Ok(order)
    }

    async fn confirm_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: PaymentReference,
    ) -> Result<Confirmation, CheckoutError> {
        let current = self.orders.get_order(user, order).await?;

        if !current.accepts_reference(&reference) {
            warn!(%order, %reference, "confirmation with foreign payment reference");

            return Err(CheckoutError::ReferenceMismatch);
        }

        let outcome = if current.payment_status == PaymentStatus::Pending {
            let verification = self.gateway.verify(&reference).await;

            self.engine
                .reconcile(user, order, &reference, &verification)
                .await?
        } else {
            debug!(%order, payment_status = %current.payment_status, "order settled, skipping gateway");

            self.engine.settle(current).await?
        };

        match outcome {
            Reconciliation::Confirmed(order) => Ok(Confirmation::Confirmed(order)),
            Reconciliation::AlreadyReconciled(order)
                if order.payment_status == PaymentStatus::Failed =>
            {
                debug!(order = %order.uuid, "payment was already rejected");

                Err(CheckoutError::GatewayRejected {
                    reason: ALREADY_REJECTED.to_string(),
                })
            }
            Reconciliation::AlreadyReconciled(order) => Ok(Confirmation::AlreadyReconciled(order)),
            Reconciliation::Rejected { reason, .. } => Err(CheckoutError::GatewayRejected { reason }),
        }
    }

    async fn get_order(&self, user: UserUuid, order: OrderUuid) -> Result<Order, CheckoutError> {
        Ok(self.orders.get_order(user, order).await?)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, CheckoutError> {
        Ok(self.orders.list_orders(user).await?)
    }
}

#[automock]
#[async_trait]
pub trait CheckoutService: Send + Sync {
    /// The user's current cart.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CheckoutError>;

    /// Add units of a variant to the user's cart, clamped to live stock.
    async fn add_to_cart(
        &self,
        user: UserUuid,
        variant: VariantUuid,
        quantity: u64,
    ) -> Result<CartChange, CheckoutError>;

    /// Set the quantity of a cart line. Zero or less removes it.
    async fn update_cart_item(
        &self,
        user: UserUuid,
        variant: VariantUuid,
        quantity: i64,
    ) -> Result<CartChange, CheckoutError>;

    /// Remove a variant from the cart. Removing an absent variant is a no-op.
    async fn remove_from_cart(
        &self,
        user: UserUuid,
        variant: VariantUuid,
    ) -> Result<Cart, CheckoutError>;

    /// Turn the cart into a pending order and take the ordered lines out of
    /// the cart. Lines added while the order was being built stay.
    async fn checkout(
        &self,
        user: UserUuid,
        shipping_address: ShippingAddress,
    ) -> Result<Order, CheckoutError>;

    /// Verify the payment made for `order` and reconcile the result.
    ///
    /// A rejected payment is reported as [`CheckoutError::GatewayRejected`]
    /// on every call, not only the one that saw the gateway decline it.
    async fn confirm_order(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: PaymentReference,
    ) -> Result<Confirmation, CheckoutError>;

    /// One of the user's orders.
    async fn get_order(&self, user: UserUuid, order: OrderUuid) -> Result<Order, CheckoutError>;

    /// The user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, CheckoutError>;
}

//! Reconciliation Engine
//!
//! Applies a payment verification result to an order. Every call is safe to
//! repeat: the payment transition is a conditional update that only fires
//! while the payment is `pending`, and stock is taken through the inventory
//! ledger so each `(order, variant)` pair is decremented at most once. A
//! second call for an already paid order re-attempts outstanding decrements
//! and reports [`Reconciliation::AlreadyReconciled`].

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    auth::models::UserUuid,
    domain::{
        checkout::{errors::CheckoutError, models::Reconciliation},
        inventory::InventoryService,
        orders::{
            OrdersService, OrdersServiceError,
            models::{Order, OrderUuid, PaymentStatus, PaymentTransition},
        },
        payments::models::{PaymentReference, Verification, VerifiedPayment},
    },
};

#[derive(Clone)]
pub struct ReconciliationEngine {
    orders: Arc<dyn OrdersService>,
    inventory: Arc<dyn InventoryService>,
}

impl std::fmt::Debug for ReconciliationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconciliationEngine").finish_non_exhaustive()
    }
}

impl ReconciliationEngine {
    #[must_use]
    pub fn new(orders: Arc<dyn OrdersService>, inventory: Arc<dyn InventoryService>) -> Self {
        Self { orders, inventory }
    }

    /// Apply `verification` for `reference` to the user's order.
    ///
    /// The order is re-read first so stale results never act on an outdated
    /// view.
    ///
    /// # Errors
    ///
    /// * [`CheckoutError::ReferenceMismatch`] when the order is bound to a
    ///   different reference, or the reference already settled another order.
    /// * [`CheckoutError::AmountMismatch`] when the verified amount or
    ///   currency differs from the order's.
    /// * [`CheckoutError::TransportFailure`] for an unusable gateway answer.
    /// * [`CheckoutError::InsufficientStock`] when stock could not be taken
    ///   after the payment was recorded; the order stays paid and a later
    ///   call finishes the decrements.
    pub async fn reconcile(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
        verification: &Verification,
    ) -> Result<Reconciliation, CheckoutError> {
        let current = self.orders.get_order(user, order).await?;

        ensure_reference(&current, reference)?;

        if current.payment_status != PaymentStatus::Pending {
            if let Verification::NotVerified { reason } = verification {
                warn!(order = %current.uuid, %reason, payment_status = %current.payment_status, "ignoring stale rejection for settled order");
            }

            return self.settle(current).await;
        }

        match verification {
            Verification::TransportFailure { detail } => {
                debug!(order = %current.uuid, %detail, "verification inconclusive");

                Err(CheckoutError::TransportFailure {
                    detail: detail.clone(),
                })
            }
            Verification::NotVerified { reason } => {
                self.reject(user, current, reference, reason).await
            }
            Verification::Verified(payment) if payment.reference != *reference => {
                warn!(order = %current.uuid, %reference, verified = %payment.reference, "verification is for another reference");

                Err(CheckoutError::ReferenceMismatch)
            }
            Verification::Verified(payment) => self.confirm(user, current, payment).await,
        }
    }

    /// Bring an order whose payment is no longer pending to its settled state.
    ///
    /// For a paid order every line's decrement is re-attempted through the
    /// ledger. Failed and refunded orders are terminal and returned as is.
    ///
    /// # Errors
    ///
    /// [`CheckoutError::InsufficientStock`] when an outstanding decrement
    /// still cannot be applied, [`CheckoutError::Conflict`] for an order that
    /// is still pending, or a storage error.
    pub async fn settle(&self, order: Order) -> Result<Reconciliation, CheckoutError> {
        match order.payment_status {
            PaymentStatus::Paid => {
                let applied = self.take_stock(&order).await?;

                if applied > 0 {
                    info!(order = %order.uuid, applied, "completed outstanding stock decrements");
                }

                Ok(Reconciliation::AlreadyReconciled(order))
            }
            PaymentStatus::Failed | PaymentStatus::Refunded => {
                debug!(order = %order.uuid, payment_status = %order.payment_status, "order already settled");

                Ok(Reconciliation::AlreadyReconciled(order))
            }
            PaymentStatus::Pending => Err(CheckoutError::Conflict),
        }
    }

    async fn confirm(
        &self,
        user: UserUuid,
        order: Order,
        payment: &VerifiedPayment,
    ) -> Result<Reconciliation, CheckoutError> {
        if payment.amount != order.total || !payment.currency.eq_ignore_ascii_case(&order.currency)
        {
            warn!(
                order = %order.uuid,
                expected_amount = order.total,
                expected_currency = %order.currency,
                verified_amount = payment.amount,
                verified_currency = %payment.currency,
                "verified payment does not match order"
            );

            return Err(CheckoutError::AmountMismatch);
        }

        let transition = self
            .orders
            .mark_paid(user, order.uuid, &payment.reference, payment.paid_at)
            .await
            .map_err(reference_conflict)?;

        match transition {
            PaymentTransition::Applied(paid) => {
                info!(order = %paid.uuid, reference = %payment.reference, total = paid.total, "payment confirmed");

                self.take_stock(&paid).await?;

                Ok(Reconciliation::Confirmed(paid))
            }
            PaymentTransition::Unchanged(current) => {
                debug!(order = %current.uuid, "payment settled concurrently");

                ensure_reference(&current, &payment.reference)?;

                self.settle(current).await
            }
        }
    }

    async fn reject(
        &self,
        user: UserUuid,
        order: Order,
        reference: &PaymentReference,
        reason: &str,
    ) -> Result<Reconciliation, CheckoutError> {
        let transition = self
            .orders
            .mark_payment_failed(user, order.uuid, reference)
            .await
            .map_err(reference_conflict)?;

        match transition {
            PaymentTransition::Applied(failed) => {
                info!(order = %failed.uuid, %reference, %reason, "payment rejected");

                Ok(Reconciliation::Rejected {
                    order: failed,
                    reason: reason.to_string(),
                })
            }
            PaymentTransition::Unchanged(current) => {
                debug!(order = %current.uuid, "payment settled concurrently");

                ensure_reference(&current, reference)?;

                self.settle(current).await
            }
        }
    }

    /// Decrement stock for every line of a paid order through the ledger.
    ///
    /// All lines are attempted even if one fails, so a retry only has the
    /// failed lines left. Returns how many decrements this call applied.
    async fn take_stock(&self, order: &Order) -> Result<usize, CheckoutError> {
        let mut applied = 0;
        let mut first_error = None;

        for line in &order.lines {
            match self
                .inventory
                .decrement_if_not_already(order.uuid, line.variant_uuid, line.quantity)
                .await
            {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(err) => {
                    error!(
                        order = %order.uuid,
                        variant = %line.variant_uuid,
                        quantity = line.quantity,
                        error = %err,
                        "stock decrement failed for paid order"
                    );

                    if first_error.is_none() {
                        first_error = Some(err);
                    }
                }
            }
        }

        match first_error {
            Some(err) => Err(err.into()),
            None => Ok(applied),
        }
    }
}

fn ensure_reference(order: &Order, reference: &PaymentReference) -> Result<(), CheckoutError> {
    if order.accepts_reference(reference) {
        return Ok(());
    }

    warn!(order = %order.uuid, %reference, "payment reference does not match order");

    Err(CheckoutError::ReferenceMismatch)
}

/// A reference already stored on another order violates its unique index.
fn reference_conflict(error: OrdersServiceError) -> CheckoutError {
    match error {
        OrdersServiceError::AlreadyExists => CheckoutError::ReferenceMismatch,
        other => other.into(),
    }
}

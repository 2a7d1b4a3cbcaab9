//! Orders service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    auth::models::UserUuid,
    database::Db,
    domain::{
        orders::{
            errors::OrdersServiceError,
            models::{NewOrder, Order, OrderUuid, PaymentTransition},
            repository::PgOrdersRepository,
        },
        payments::models::PaymentReference,
    },
};

#[derive(Debug, Clone)]
pub struct PgOrdersService {
    db: Db,
    repository: PgOrdersRepository,
}

impl PgOrdersService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgOrdersRepository::new(),
        }
    }
}

#[async_trait]
impl OrdersService for PgOrdersService {
    async fn create_order(
        &self,
        user: UserUuid,
        order: NewOrder,
    ) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let created = self.repository.create_order(&mut tx, user, &order).await?;

        tx.commit().await?;

        info!(order = %created.uuid, %user, total = created.total, "order created");

        Ok(created)
    }

    async fn get_order(&self, user: UserUuid, order: OrderUuid) -> Result<Order, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let found = self.repository.get_order(&mut tx, user, order).await?;

        tx.commit().await?;

        Ok(found)
    }

    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let orders = self.repository.list_orders(&mut tx, user).await?;

        tx.commit().await?;

        Ok(orders)
    }

    async fn mark_paid(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
        paid_at: Timestamp,
    ) -> Result<PaymentTransition, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let updated = self
            .repository
            .mark_paid(&mut tx, user, order, reference, paid_at)
            .await?;

        let transition = match updated {
            Some(order) => PaymentTransition::Applied(order),
            None => PaymentTransition::Unchanged(self.repository.get_order(&mut tx, user, order).await?),
        };

        tx.commit().await?;

        Ok(transition)
    }

    async fn mark_payment_failed(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
    ) -> Result<PaymentTransition, OrdersServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let updated = self
            .repository
            .mark_payment_failed(&mut tx, user, order, reference)
            .await?;

        let transition = match updated {
            Some(order) => PaymentTransition::Applied(order),
            None => PaymentTransition::Unchanged(self.repository.get_order(&mut tx, user, order).await?),
        };

        tx.commit().await?;

        Ok(transition)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Persist a new order, header and lines together, in `{pending, pending}`.
    async fn create_order(&self, user: UserUuid, order: NewOrder)
    -> Result<Order, OrdersServiceError>;

    /// Retrieve one of the user's orders.
    async fn get_order(&self, user: UserUuid, order: OrderUuid) -> Result<Order, OrdersServiceError>;

    /// All of the user's orders, newest first.
    async fn list_orders(&self, user: UserUuid) -> Result<Vec<Order>, OrdersServiceError>;

    /// Record a captured payment: `{confirmed, paid}`, reference and paid time.
    ///
    /// Only applies while the payment is `pending` and the order holds no
    /// other reference; otherwise the stored order is returned unchanged.
    async fn mark_paid(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
        paid_at: Timestamp,
    ) -> Result<PaymentTransition, OrdersServiceError>;

    /// Record a rejected payment. Same guard as [`OrdersService::mark_paid`].
    async fn mark_payment_failed(
        &self,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
    ) -> Result<PaymentTransition, OrdersServiceError>;
}

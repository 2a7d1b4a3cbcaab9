//! Inventory service.
//!
//! Stock is only ever decremented through [`InventoryService::decrement_if_not_already`],
//! which records the decrement in a ledger keyed by `(order, variant)` in the
//! same transaction as a conditional stock update. Repeated or concurrent
//! calls for the same key apply at most once, and stock never goes negative.

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, info};

use crate::{
    database::Db,
    domain::{
        inventory::{
            errors::InventoryServiceError,
            models::{NewVariant, Variant, VariantUuid},
            repository::PgInventoryRepository,
        },
        orders::models::OrderUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgInventoryService {
    db: Db,
    repository: PgInventoryRepository,
}

impl PgInventoryService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgInventoryRepository::new(),
        }
    }
}

#[async_trait]
impl InventoryService for PgInventoryService {
    async fn get_variant(&self, variant: VariantUuid) -> Result<Variant, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let variant = self.repository.get_variant(&mut tx, variant).await?;

        tx.commit().await?;

        Ok(variant)
    }

    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let created = self.repository.create_variant(&mut tx, &variant).await?;

        tx.commit().await?;

        Ok(created)
    }

    async fn restock(
        &self,
        variant: VariantUuid,
        stock: u64,
    ) -> Result<Variant, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let updated = self
            .repository
            .restock_variant(&mut tx, variant, stock)
            .await?;

        tx.commit().await?;

        Ok(updated)
    }

    async fn read_available(&self, variant: VariantUuid) -> Result<u64, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let available = self.repository.read_available(&mut tx, variant).await?;

        tx.commit().await?;

        Ok(available)
    }

    async fn decrement_if_not_already(
        &self,
        order: OrderUuid,
        variant: VariantUuid,
        quantity: u64,
    ) -> Result<bool, InventoryServiceError> {
        let mut tx = self.db.begin().await?;

        let recorded = self
            .repository
            .record_stock_decrement(&mut tx, order, variant, quantity)
            .await?;

        if !recorded {
            debug!(%order, %variant, "stock decrement already applied");

            tx.rollback().await?;

            return Ok(false);
        }

        let Some(remaining) = self
            .repository
            .decrement_stock(&mut tx, variant, quantity)
            .await?
        else {
            // Dropping the ledger row with the transaction lets a later retry
            // apply the decrement once stock is available again.
            tx.rollback().await?;

            let available = self.read_available(variant).await?;

            return Err(InventoryServiceError::InsufficientStock { variant, available });
        };

        tx.commit().await?;

        info!(%order, %variant, quantity, remaining, "stock decremented");

        Ok(true)
    }
}

#[automock]
#[async_trait]
pub trait InventoryService: Send + Sync {
    /// Retrieve a single variant with its price and current stock.
    async fn get_variant(&self, variant: VariantUuid) -> Result<Variant, InventoryServiceError>;

    /// Creates a new variant.
    async fn create_variant(&self, variant: NewVariant) -> Result<Variant, InventoryServiceError>;

    /// Overwrites the stock level of a variant.
    async fn restock(&self, variant: VariantUuid, stock: u64)
    -> Result<Variant, InventoryServiceError>;

    /// Point-in-time stock read. Takes no locks.
    async fn read_available(&self, variant: VariantUuid) -> Result<u64, InventoryServiceError>;

    /// Decrement stock for one order line at most once.
    ///
    /// Returns `true` if this call applied the decrement and `false` if it had
    /// already been applied for this `(order, variant)` pair.
    async fn decrement_if_not_already(
        &self,
        order: OrderUuid,
        variant: VariantUuid,
        quantity: u64,
    ) -> Result<bool, InventoryServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::{
            inventory::models::ProductUuid,
            orders::{OrdersService, models::NewOrder},
        },
        test::{TestContext, shipping_address},
    };

    use super::*;

    async fn seed(ctx: &TestContext, price: u64, stock: u64) -> Result<Variant, InventoryServiceError> {
        ctx.inventory
            .create_variant(NewVariant {
                uuid: VariantUuid::new(),
                product_uuid: ProductUuid::new(),
                price,
                stock,
            })
            .await
    }

    async fn pending_order(ctx: &TestContext, variant: &Variant) -> TestResult<OrderUuid> {
        let order = ctx
            .orders
            .create_order(
                ctx.user_uuid,
                NewOrder {
                    uuid: OrderUuid::new(),
                    lines: vec![crate::domain::orders::models::OrderLine {
                        variant_uuid: variant.uuid,
                        product_uuid: variant.product_uuid,
                        quantity: 1,
                        unit_price: variant.price,
                    }],
                    subtotal: variant.price,
                    shipping: 0,
                    total: variant.price,
                    currency: "GBP".to_string(),
                    shipping_address: shipping_address(),
                },
            )
            .await?;

        Ok(order.uuid)
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn create_and_read_variant() -> TestResult {
        let ctx = TestContext::new().await;
        let created = seed(&ctx, 1000, 5).await?;

        let fetched = ctx.inventory.get_variant(created.uuid).await?;

        assert_eq!(fetched, created);
        assert_eq!(ctx.inventory.read_available(created.uuid).await?, 5);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn unknown_variant_is_not_found() {
        let ctx = TestContext::new().await;

        let result = ctx.inventory.read_available(VariantUuid::new()).await;

        assert!(
            matches!(result, Err(InventoryServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn decrement_applies_once_per_order_and_variant() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = seed(&ctx, 1000, 5).await?;
        let order = pending_order(&ctx, &variant).await?;

        assert!(ctx.inventory.decrement_if_not_already(order, variant.uuid, 2).await?);
        assert!(!ctx.inventory.decrement_if_not_already(order, variant.uuid, 2).await?);
        assert_eq!(ctx.inventory.read_available(variant.uuid).await?, 3);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn insufficient_stock_leaves_no_ledger_row() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = seed(&ctx, 1000, 1).await?;
        let order = pending_order(&ctx, &variant).await?;

        let result = ctx
            .inventory
            .decrement_if_not_already(order, variant.uuid, 2)
            .await;

        assert!(
            matches!(result, Err(InventoryServiceError::InsufficientStock { available: 1, .. })),
            "expected InsufficientStock, got {result:?}"
        );

        ctx.inventory.restock(variant.uuid, 4).await?;

        assert!(ctx.inventory.decrement_if_not_already(order, variant.uuid, 2).await?);
        assert_eq!(ctx.inventory.read_available(variant.uuid).await?, 2);

        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires docker"]
    async fn concurrent_decrements_never_oversell() -> TestResult {
        let ctx = TestContext::new().await;
        let variant = seed(&ctx, 1000, 3).await?;
        let first = pending_order(&ctx, &variant).await?;
        let second = pending_order(&ctx, &variant).await?;

        let (a, b) = tokio::join!(
            ctx.inventory.decrement_if_not_already(first, variant.uuid, 2),
            ctx.inventory.decrement_if_not_already(second, variant.uuid, 2),
        );

        assert_eq!(
            [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(),
            1,
            "only one decrement fits: {a:?} {b:?}"
        );
        assert_eq!(ctx.inventory.read_available(variant.uuid).await?, 1);

        Ok(())
    }
}

//! Inventory Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};

use crate::{
    database::{to_i64, try_get_u64},
    domain::{
        inventory::models::{NewVariant, Variant, VariantUuid},
        orders::models::OrderUuid,
    },
};

const GET_VARIANT_SQL: &str = include_str!("sql/get_variant.sql");
const CREATE_VARIANT_SQL: &str = include_str!("sql/create_variant.sql");
const RESTOCK_VARIANT_SQL: &str = include_str!("sql/restock_variant.sql");
const READ_AVAILABLE_SQL: &str = include_str!("sql/read_available.sql");
const RECORD_STOCK_DECREMENT_SQL: &str = include_str!("sql/record_stock_decrement.sql");
const DECREMENT_STOCK_SQL: &str = include_str!("sql/decrement_stock.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgInventoryRepository;

impl PgInventoryRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<Variant, sqlx::Error> {
        query_as::<Postgres, Variant>(GET_VARIANT_SQL)
            .bind(variant.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: &NewVariant,
    ) -> Result<Variant, sqlx::Error> {
        query_as::<Postgres, Variant>(CREATE_VARIANT_SQL)
            .bind(variant.uuid.into_uuid())
            .bind(variant.product_uuid.into_uuid())
            .bind(to_i64(variant.price, "price")?)
            .bind(to_i64(variant.stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn restock_variant(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        stock: u64,
    ) -> Result<Variant, sqlx::Error> {
        query_as::<Postgres, Variant>(RESTOCK_VARIANT_SQL)
            .bind(variant.into_uuid())
            .bind(to_i64(stock, "stock")?)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn read_available(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
    ) -> Result<u64, sqlx::Error> {
        let stock: i64 = query_scalar(READ_AVAILABLE_SQL)
            .bind(variant.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        u64::try_from(stock).map_err(|e| sqlx::Error::ColumnDecode {
            index: "stock".to_string(),
            source: Box::new(e),
        })
    }

    /// Insert the ledger row for `(order, variant)`.
    ///
    /// Returns `false` when the row already existed.
    pub(crate) async fn record_stock_decrement(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        variant: VariantUuid,
        quantity: u64,
    ) -> Result<bool, sqlx::Error> {
        let rows_affected = query(RECORD_STOCK_DECREMENT_SQL)
            .bind(order.into_uuid())
            .bind(variant.into_uuid())
            .bind(to_i64(quantity, "quantity")?)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected == 1)
    }

    /// Conditionally decrement stock.
    ///
    /// Returns the remaining stock, or `None` when the variant holds fewer
    /// than `quantity` units.
    pub(crate) async fn decrement_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        variant: VariantUuid,
        quantity: u64,
    ) -> Result<Option<i64>, sqlx::Error> {
        query_scalar(DECREMENT_STOCK_SQL)
            .bind(variant.into_uuid())
            .bind(to_i64(quantity, "quantity")?)
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for Variant {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: VariantUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: row.try_get::<uuid::Uuid, _>("product_uuid")?.into(),
            price: try_get_u64(row, "price")?,
            stock: try_get_u64(row, "stock")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

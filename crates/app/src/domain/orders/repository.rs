//! Orders Repository

use std::{collections::HashMap, str::FromStr};

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::models::UserUuid,
    database::{to_i64, try_get_u64},
    domain::{
        orders::models::{NewOrder, Order, OrderLine, OrderUuid, ShippingAddress},
        payments::models::PaymentReference,
    },
};

const CREATE_ORDER_SQL: &str = include_str!("sql/create_order.sql");
const CREATE_ORDER_LINE_SQL: &str = include_str!("sql/create_order_line.sql");
const GET_ORDER_SQL: &str = include_str!("sql/get_order.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const GET_ORDER_LINES_SQL: &str = include_str!("sql/get_order_lines.sql");
const MARK_PAID_SQL: &str = include_str!("sql/mark_paid.sql");
const MARK_PAYMENT_FAILED_SQL: &str = include_str!("sql/mark_payment_failed.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: &NewOrder,
    ) -> Result<Order, sqlx::Error> {
        let address = &order.shipping_address;

        let mut created = query_as::<Postgres, Order>(CREATE_ORDER_SQL)
            .bind(order.uuid.into_uuid())
            .bind(user.into_uuid())
            .bind(to_i64(order.subtotal, "subtotal")?)
            .bind(to_i64(order.shipping, "shipping")?)
            .bind(to_i64(order.total, "total")?)
            .bind(&order.currency)
            .bind(&address.recipient)
            .bind(&address.line1)
            .bind(address.line2.as_deref())
            .bind(&address.city)
            .bind(&address.postal_code)
            .bind(&address.country)
            .fetch_one(&mut **tx)
            .await?;

        for (position, line) in order.lines.iter().enumerate() {
            query(CREATE_ORDER_LINE_SQL)
                .bind(order.uuid.into_uuid())
                .bind(i32::try_from(position).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
                .bind(line.variant_uuid.into_uuid())
                .bind(line.product_uuid.into_uuid())
                .bind(to_i64(line.quantity, "quantity")?)
                .bind(to_i64(line.unit_price, "unit_price")?)
                .execute(&mut **tx)
                .await?;
        }

        created.lines.clone_from(&order.lines);

        Ok(created)
    }

    pub(crate) async fn get_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
    ) -> Result<Order, sqlx::Error> {
        let mut found = query_as::<Postgres, Order>(GET_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        self.attach_lines(tx, std::slice::from_mut(&mut found))
            .await?;

        Ok(found)
    }

    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Vec<Order>, sqlx::Error> {
        let mut orders = query_as::<Postgres, Order>(LIST_ORDERS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        self.attach_lines(tx, &mut orders).await?;

        Ok(orders)
    }

    /// Conditionally move a pending payment to `paid` and the order to
    /// `confirmed` in one update.
    ///
    /// Returns `None` when the order is not pending or already holds a
    /// different reference.
    pub(crate) async fn mark_paid(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
        paid_at: Timestamp,
    ) -> Result<Option<Order>, sqlx::Error> {
        let updated = query_as::<Postgres, Order>(MARK_PAID_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(reference.as_str())
            .bind(SqlxTimestamp::from(paid_at))
            .fetch_optional(&mut **tx)
            .await?;

        self.attach_optional_lines(tx, updated).await
    }

    /// Conditionally move a pending payment to `failed`. Order status is left
    /// alone.
    pub(crate) async fn mark_payment_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        order: OrderUuid,
        reference: &PaymentReference,
    ) -> Result<Option<Order>, sqlx::Error> {
        let updated = query_as::<Postgres, Order>(MARK_PAYMENT_FAILED_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(reference.as_str())
            .fetch_optional(&mut **tx)
            .await?;

        self.attach_optional_lines(tx, updated).await
    }

    async fn attach_optional_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: Option<Order>,
    ) -> Result<Option<Order>, sqlx::Error> {
        let Some(mut order) = order else {
            return Ok(None);
        };

        self.attach_lines(tx, std::slice::from_mut(&mut order))
            .await?;

        Ok(Some(order))
    }

    async fn attach_lines(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        orders: &mut [Order],
    ) -> Result<(), sqlx::Error> {
        if orders.is_empty() {
            return Ok(());
        }

        let uuids: Vec<Uuid> = orders.iter().map(|order| order.uuid.into_uuid()).collect();

        let rows = query_as::<Postgres, StoredOrderLine>(GET_ORDER_LINES_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut by_order: HashMap<OrderUuid, Vec<OrderLine>> = HashMap::new();

        for row in rows {
            by_order.entry(row.order_uuid).or_default().push(row.line);
        }

        for order in orders {
            order.lines = by_order.remove(&order.uuid).unwrap_or_default();
        }

        Ok(())
    }
}

pub(crate) struct StoredOrderLine {
    order_uuid: OrderUuid,
    line: OrderLine,
}

impl<'r> FromRow<'r, PgRow> for StoredOrderLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order_uuid: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            line: OrderLine {
                variant_uuid: row.try_get::<Uuid, _>("variant_uuid")?.into(),
                product_uuid: row.try_get::<Uuid, _>("product_uuid")?.into(),
                quantity: try_get_u64(row, "quantity")?,
                unit_price: try_get_u64(row, "unit_price")?,
            },
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let payment_reference = row
            .try_get::<Option<String>, _>("payment_reference")?
            .map(|reference| PaymentReference::new(reference).map_err(|e| decode("payment_reference", e)))
            .transpose()?;

        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user_uuid: UserUuid::from_uuid(row.try_get("user_uuid")?),
            lines: Vec::new(),
            subtotal: try_get_u64(row, "subtotal")?,
            shipping: try_get_u64(row, "shipping")?,
            total: try_get_u64(row, "total")?,
            currency: row.try_get("currency")?,
            status: try_get_parsed(row, "status")?,
            payment_status: try_get_parsed(row, "payment_status")?,
            payment_reference,
            shipping_address: ShippingAddress {
                recipient: row.try_get("ship_recipient")?,
                line1: row.try_get("ship_line1")?,
                line2: row.try_get("ship_line2")?,
                city: row.try_get("ship_city")?,
                postal_code: row.try_get("ship_postal_code")?,
                country: row.try_get("ship_country")?,
            },
            paid_at: row
                .try_get::<Option<SqlxTimestamp>, _>("paid_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}

fn try_get_parsed<T>(row: &PgRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value: String = row.try_get(col)?;

    value.parse().map_err(|e| decode(col, e))
}

fn decode(col: &str, error: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(error),
    }
}

//! Cart Items Repository

use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::{
    auth::models::UserUuid,
    database::{to_i64, try_get_u64},
    domain::carts::models::{Cart, CartLine},
};

const GET_CART_ITEMS_SQL: &str = include_str!("sql/get_cart_items.sql");
const CREATE_CART_ITEM_SQL: &str = include_str!("sql/create_cart_item.sql");
const DELETE_CART_ITEMS_SQL: &str = include_str!("sql/delete_cart_items.sql");
const REDUCE_CART_ITEM_SQL: &str = include_str!("sql/reduce_cart_item.sql");
const DELETE_ORDERED_CART_ITEM_SQL: &str = include_str!("sql/delete_ordered_cart_item.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCartItemsRepository;

impl PgCartItemsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<Cart, sqlx::Error> {
        let lines = query_as::<Postgres, CartLine>(GET_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        Ok(Cart::from_lines(lines))
    }

    pub(crate) async fn replace_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        cart: &Cart,
    ) -> Result<(), sqlx::Error> {
        self.delete_cart(tx, user).await?;

        for (position, line) in cart.lines().iter().enumerate() {
            query(CREATE_CART_ITEM_SQL)
                .bind(user.into_uuid())
                .bind(i32::try_from(position).map_err(|e| sqlx::Error::Encode(Box::new(e)))?)
                .bind(line.variant_uuid.into_uuid())
                .bind(line.product_uuid.into_uuid())
                .bind(to_i64(line.unit_price, "unit_price")?)
                .bind(to_i64(line.quantity, "quantity")?)
                .bind(to_i64(line.available_stock, "available_stock")?)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }

    pub(crate) async fn delete_cart(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_CART_ITEMS_SQL)
            .bind(user.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    /// Subtract an ordered quantity from the user's line for `line.variant_uuid`,
    /// deleting the line when nothing is left. Returns the rows touched.
    pub(crate) async fn remove_ordered_line(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user: UserUuid,
        line: &CartLine,
    ) -> Result<u64, sqlx::Error> {
        let quantity = to_i64(line.quantity, "quantity")?;

        let deleted = query(DELETE_ORDERED_CART_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(line.variant_uuid.into_uuid())
            .bind(quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        let reduced = query(REDUCE_CART_ITEM_SQL)
            .bind(user.into_uuid())
            .bind(line.variant_uuid.into_uuid())
            .bind(quantity)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(deleted + reduced)
    }
}

impl<'r> FromRow<'r, PgRow> for CartLine {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            variant_uuid: row.try_get::<Uuid, _>("variant_uuid")?.into(),
            product_uuid: row.try_get::<Uuid, _>("product_uuid")?.into(),
            unit_price: try_get_u64(row, "unit_price")?,
            quantity: try_get_u64(row, "quantity")?,
            available_stock: try_get_u64(row, "available_stock")?,
        })
    }
}

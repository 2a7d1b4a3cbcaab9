//! Carts service.

use async_trait::async_trait;
use mockall::automock;
use tracing::debug;

use crate::{
    auth::models::UserUuid,
    database::Db,
    domain::carts::{errors::CartsServiceError, models::Cart, repository::PgCartItemsRepository},
};

#[derive(Debug, Clone)]
pub struct PgCartsService {
    db: Db,
    repository: PgCartItemsRepository,
}

impl PgCartsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCartItemsRepository::new(),
        }
    }
}

#[async_trait]
impl CartsService for PgCartsService {
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        let cart = self.repository.get_cart(&mut tx, user).await?;

        tx.commit().await?;

        Ok(cart)
    }

    async fn save_cart(&self, user: UserUuid, cart: &Cart) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;

        self.repository.replace_cart(&mut tx, user, cart).await?;

        tx.commit().await?;

        Ok(())
    }

    async fn remove_ordered(&self, user: UserUuid, ordered: &Cart) -> Result<(), CartsServiceError> {
        let mut tx = self.db.begin_user_transaction(user).await?;
        let mut touched = 0;

        for line in ordered.lines() {
            touched += self.repository.remove_ordered_line(&mut tx, user, line).await?;
        }

        tx.commit().await?;

        debug!(%user, touched, "ordered lines removed from cart");

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Load the user's cart. A user without a stored cart gets an empty one.
    async fn get_cart(&self, user: UserUuid) -> Result<Cart, CartsServiceError>;

    /// Replace the user's stored cart with `cart`.
    async fn save_cart(&self, user: UserUuid, cart: &Cart) -> Result<(), CartsServiceError>;

    /// Take the lines of an ordered cart out of the user's stored cart.
    ///
    /// See [`Cart::remove_ordered`]: anything added after `ordered` was read
    /// stays in the cart.
    async fn remove_ordered(&self, user: UserUuid, ordered: &Cart) -> Result<(), CartsServiceError>;
}

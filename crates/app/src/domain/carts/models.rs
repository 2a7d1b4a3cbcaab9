//! Cart Models
//!
//! A [`Cart`] is a plain value: every operation is a pure function of the
//! cart and its arguments. Loading and saving it is the job of
//! [`CartsService`](crate::domain::carts::CartsService).

use thiserror::Error;

use crate::domain::inventory::models::{ProductUuid, Variant, VariantUuid};

/// CartLine Model
///
/// `unit_price` and `available_stock` are snapshots taken the last time the
/// variant was added or refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub variant_uuid: VariantUuid,
    pub product_uuid: ProductUuid,
    pub unit_price: u64,
    pub quantity: u64,
    pub available_stock: u64,
}

impl CartLine {
    /// `unit_price * quantity`, or `None` when that does not fit in a `u64`.
    #[must_use]
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(self.quantity)
    }
}

/// Cart Model
///
/// Lines keep insertion order and hold at most one line per variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

/// What a cart mutation did to the affected line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUpdate {
    /// The line now holds exactly what was asked for.
    Updated { quantity: u64 },

    /// Less stock was available than requested; the line was clamped to
    /// `available` (and dropped when that is zero).
    StockLimited { requested: u64, available: u64 },

    /// The line was removed.
    Removed,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("cart line not found")]
    NotFound,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("cart total is too large")]
    TotalOverflow,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: u64,
    pub item_count: u64,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from stored lines, in stored order.
    #[must_use]
    pub(crate) fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, variant: VariantUuid) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.variant_uuid == variant)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of `variant`, merging with any existing line.
    ///
    /// The resulting quantity is clamped to the variant's current stock, and
    /// the line's price and stock snapshot are refreshed from `variant`.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] when `quantity` is zero, and
    /// [`CartError::TotalOverflow`] when the cart's totals would no longer
    /// fit in a `u64`. The cart is unchanged on error.
    pub fn add_item(&mut self, variant: &Variant, quantity: u64) -> Result<CartUpdate, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let existing = self.line(variant.uuid).map_or(0, |line| line.quantity);
        let requested = existing
            .checked_add(quantity)
            .ok_or(CartError::TotalOverflow)?;

        let mut next = self.clone();
        let update = next.set_line(variant, requested);

        next.totals()?;
        *self = next;

        Ok(update)
    }

    /// Set a line's quantity outright. Zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotFound`] when the cart has no line for
    /// `variant`, and [`CartError::TotalOverflow`] when the new quantity
    /// would overflow the cart's totals. The cart is unchanged on error.
    pub fn update_quantity(
        &mut self,
        variant: VariantUuid,
        quantity: i64,
    ) -> Result<CartUpdate, CartError> {
        if self.line(variant).is_none() {
            return Err(CartError::NotFound);
        }

        let requested = match u64::try_from(quantity) {
            Ok(0) | Err(_) => {
                self.remove_item(variant);

                return Ok(CartUpdate::Removed);
            }
            Ok(requested) => requested,
        };

        let mut next = self.clone();
        let update = next.set_quantity(variant, requested)?;

        next.totals()?;
        *self = next;

        Ok(update)
    }

    /// Remove the line for `variant`. Returns whether a line was removed.
    pub fn remove_item(&mut self, variant: VariantUuid) -> bool {
        let before = self.lines.len();

        self.lines.retain(|line| line.variant_uuid != variant);

        self.lines.len() != before
    }

    /// Take the lines of `ordered` back out of this cart.
    ///
    /// Each ordered quantity is subtracted from the matching line, and lines
    /// that reach zero are dropped. Lines that were not ordered, and units
    /// added on top of an ordered line, stay in the cart.
    pub fn remove_ordered(&mut self, ordered: &Cart) {
        for taken in &ordered.lines {
            self.lines.retain_mut(|line| {
                if line.variant_uuid != taken.variant_uuid {
                    return true;
                }

                line.quantity = line.quantity.saturating_sub(taken.quantity);

                line.quantity > 0
            });
        }
    }

    /// Refresh an existing line's price and stock snapshot without changing
    /// its quantity. Returns whether the cart holds the variant.
    pub fn refresh(&mut self, variant: &Variant) -> bool {
        let Some(line) = self
            .lines
            .iter_mut()
            .find(|line| line.variant_uuid == variant.uuid)
        else {
            return false;
        };

        line.product_uuid = variant.product_uuid;
        line.unit_price = variant.price;
        line.available_stock = variant.stock;

        true
    }

    /// Subtotal and unit count across all lines.
    ///
    /// # Errors
    ///
    /// [`CartError::TotalOverflow`] when either sum does not fit in a `u64`.
    pub fn totals(&self) -> Result<CartTotals, CartError> {
        self.lines
            .iter()
            .try_fold(CartTotals::default(), |totals, line| {
                Some(CartTotals {
                    subtotal: totals.subtotal.checked_add(line.line_total()?)?,
                    item_count: totals.item_count.checked_add(line.quantity)?,
                })
            })
            .ok_or(CartError::TotalOverflow)
    }

    fn set_quantity(
        &mut self,
        variant: VariantUuid,
        requested: u64,
    ) -> Result<CartUpdate, CartError> {
        let line = self
            .lines
            .iter_mut()
            .find(|line| line.variant_uuid == variant)
            .ok_or(CartError::NotFound)?;

        let available = line.available_stock;

        if requested <= available {
            line.quantity = requested;

            return Ok(CartUpdate::Updated {
                quantity: requested,
            });
        }

        if available == 0 {
            self.remove_item(variant);
        } else {
            line.quantity = available;
        }

        Ok(CartUpdate::StockLimited {
            requested,
            available,
        })
    }

    fn set_line(&mut self, variant: &Variant, requested: u64) -> CartUpdate {
        let available = variant.stock;
        let quantity = requested.min(available);

        if quantity == 0 {
            self.remove_item(variant.uuid);

            return CartUpdate::StockLimited {
                requested,
                available,
            };
        }

        let line = CartLine {
            variant_uuid: variant.uuid,
            product_uuid: variant.product_uuid,
            unit_price: variant.price,
            quantity,
            available_stock: available,
        };

        match self
            .lines
            .iter_mut()
            .find(|existing| existing.variant_uuid == variant.uuid)
        {
            Some(existing) => *existing = line,
            None => self.lines.push(line),
        }

        if quantity < requested {
            CartUpdate::StockLimited {
                requested,
                available,
            }
        } else {
            CartUpdate::Updated { quantity }
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    fn variant(price: u64, stock: u64) -> Variant {
        Variant {
            uuid: VariantUuid::new(),
            product_uuid: ProductUuid::new(),
            price,
            stock,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn restocked(variant: &Variant, stock: u64) -> Variant {
        Variant {
            stock,
            ..variant.clone()
        }
    }

    #[test]
    fn add_item_inserts_new_line() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 10);

        let update = cart.add_item(&shirt, 2)?;

        assert_eq!(update, CartUpdate::Updated { quantity: 2 });
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[0].unit_price, 1000);

        Ok(())
    }

    #[test]
    fn repeated_adds_merge_into_one_clamped_line() -> Result<(), CartError> {
        let shirt = variant(1000, 7);

        let mut merged = Cart::new();
        merged.add_item(&shirt, 3)?;
        merged.add_item(&shirt, 3)?;
        merged.add_item(&shirt, 3)?;

        assert_eq!(merged.lines().len(), 1);
        assert_eq!(merged.lines()[0].quantity, 7.min(3 + 3 + 3));

        let mut single = Cart::new();
        single.add_item(&shirt, 9)?;

        assert_eq!(merged, single);

        Ok(())
    }

    #[test]
    fn add_beyond_stock_reports_stock_limited() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);

        assert_eq!(cart.add_item(&shirt, 3)?, CartUpdate::Updated { quantity: 3 });
        assert_eq!(
            cart.add_item(&shirt, 4)?,
            CartUpdate::StockLimited {
                requested: 7,
                available: 5
            }
        );
        assert_eq!(cart.lines()[0].quantity, 5);

        Ok(())
    }

    #[test]
    fn add_refreshes_price_and_stock_snapshot() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);

        cart.add_item(&shirt, 1)?;

        let repriced = Variant {
            price: 1200,
            stock: 8,
            ..shirt.clone()
        };

        cart.add_item(&repriced, 1)?;

        let line = cart.line(shirt.uuid).ok_or(CartError::NotFound)?;

        assert_eq!(line.quantity, 2);
        assert_eq!(line.unit_price, 1200);
        assert_eq!(line.available_stock, 8);

        Ok(())
    }

    #[test]
    fn add_of_sold_out_variant_stores_nothing() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);

        cart.add_item(&shirt, 2)?;

        let update = cart.add_item(&restocked(&shirt, 0), 1)?;

        assert_eq!(
            update,
            CartUpdate::StockLimited {
                requested: 3,
                available: 0
            }
        );
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn add_zero_is_invalid() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.add_item(&variant(1000, 5), 0),
            Err(CartError::InvalidQuantity)
        );
        assert!(cart.is_empty());
    }

    #[test]
    fn update_quantity_sets_clamps_and_removes() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);

        cart.add_item(&shirt, 1)?;

        assert_eq!(
            cart.update_quantity(shirt.uuid, 4)?,
            CartUpdate::Updated { quantity: 4 }
        );
        assert_eq!(
            cart.update_quantity(shirt.uuid, 9)?,
            CartUpdate::StockLimited {
                requested: 9,
                available: 5
            }
        );
        assert_eq!(cart.lines()[0].quantity, 5);
        assert_eq!(cart.update_quantity(shirt.uuid, 0)?, CartUpdate::Removed);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn negative_quantity_removes_line() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);

        cart.add_item(&shirt, 2)?;

        assert_eq!(cart.update_quantity(shirt.uuid, -3)?, CartUpdate::Removed);
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn update_quantity_of_missing_line_is_not_found() {
        let mut cart = Cart::new();

        assert_eq!(
            cart.update_quantity(VariantUuid::new(), 1),
            Err(CartError::NotFound)
        );
    }

    #[test]
    fn remove_item_is_idempotent() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);
        let socks = variant(300, 5);

        cart.add_item(&shirt, 1)?;
        cart.add_item(&socks, 2)?;

        assert!(cart.remove_item(shirt.uuid));

        let once = cart.clone();

        assert!(!cart.remove_item(shirt.uuid));
        assert_eq!(cart, once);
        assert_eq!(cart.lines().len(), 1);

        Ok(())
    }

    #[test]
    fn totals_sum_prices_and_quantities() -> Result<(), CartError> {
        let mut cart = Cart::new();

        cart.add_item(&variant(1000, 5), 2)?;
        cart.add_item(&variant(250, 5), 3)?;

        assert_eq!(
            cart.totals()?,
            CartTotals {
                subtotal: 2750,
                item_count: 5
            }
        );

        Ok(())
    }

    #[test]
    fn add_that_overflows_totals_leaves_cart_unchanged() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let cheap = variant(1000, 5);
        let pricey = variant(u64::MAX / 2, u64::MAX);

        cart.add_item(&cheap, 1)?;
        cart.add_item(&pricey, 1)?;

        let before = cart.clone();

        assert_eq!(cart.add_item(&pricey, 2), Err(CartError::TotalOverflow));
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn update_that_overflows_totals_leaves_cart_unchanged() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let pricey = variant(u64::MAX / 2, 10);

        cart.add_item(&pricey, 1)?;

        let before = cart.clone();

        assert_eq!(
            cart.update_quantity(pricey.uuid, 3),
            Err(CartError::TotalOverflow)
        );
        assert_eq!(cart, before);

        Ok(())
    }

    #[test]
    fn remove_ordered_keeps_lines_added_since() -> Result<(), CartError> {
        let shirt = variant(1000, 10);
        let socks = variant(300, 10);

        let mut ordered = Cart::new();
        ordered.add_item(&shirt, 2)?;

        let mut current = ordered.clone();
        current.add_item(&shirt, 1)?;
        current.add_item(&socks, 1)?;

        current.remove_ordered(&ordered);

        assert_eq!(current.line(shirt.uuid).map(|line| line.quantity), Some(1));
        assert_eq!(current.line(socks.uuid).map(|line| line.quantity), Some(1));

        current.remove_ordered(&current.clone());

        assert!(current.is_empty());

        Ok(())
    }

    #[test]
    fn refresh_updates_snapshot_only_for_present_lines() -> Result<(), CartError> {
        let mut cart = Cart::new();
        let shirt = variant(1000, 5);

        cart.add_item(&shirt, 3)?;

        assert!(cart.refresh(&restocked(&shirt, 2)));
        assert_eq!(cart.lines()[0].available_stock, 2);
        assert_eq!(cart.lines()[0].quantity, 3);
        assert!(!cart.refresh(&variant(100, 1)));

        Ok(())
    }
}

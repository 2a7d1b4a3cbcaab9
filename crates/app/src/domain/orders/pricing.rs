//! Order pricing.

use thiserror::Error;

use crate::domain::orders::models::OrderLine;

/// Money breakdown of an order, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub subtotal: u64,
    pub shipping: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("order total is too large")]
    Overflow,
}

/// Computes what an order costs from its lines.
pub trait PricingPolicy: Send + Sync {
    /// # Errors
    ///
    /// [`PricingError::Overflow`] when a line total, the subtotal or the
    /// total does not fit in a `u64`.
    fn quote(&self, lines: &[OrderLine]) -> Result<Quote, PricingError>;
}

/// A single shipping charge per order, waived once the subtotal reaches
/// `free_over`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlatRateShipping {
    pub rate: u64,
    pub free_over: Option<u64>,
}

impl PricingPolicy for FlatRateShipping {
    fn quote(&self, lines: &[OrderLine]) -> Result<Quote, PricingError> {
        let subtotal = lines
            .iter()
            .try_fold(0_u64, |sum, line| sum.checked_add(line.line_total()?))
            .ok_or(PricingError::Overflow)?;

        let shipping = match self.free_over {
            Some(threshold) if subtotal >= threshold => 0,
            _ => self.rate,
        };

        Ok(Quote {
            subtotal,
            shipping,
            total: subtotal
                .checked_add(shipping)
                .ok_or(PricingError::Overflow)?,
        })
    }
}

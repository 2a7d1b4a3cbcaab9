//! Payment Models

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use jiff::Timestamp;
use thiserror::Error;

/// Opaque reference issued by the payment gateway for one payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaymentReference(String);

#[derive(Debug, Error, PartialEq, Eq)]
#[error("payment reference must not be empty")]
pub struct EmptyPaymentReference;

impl PaymentReference {
    /// Wrap a gateway reference, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyPaymentReference`] when nothing is left after trimming.
    pub fn new(reference: impl AsRef<str>) -> Result<Self, EmptyPaymentReference> {
        let trimmed = reference.as_ref().trim();

        if trimmed.is_empty() {
            return Err(EmptyPaymentReference);
        }

        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PaymentReference {
    type Err = EmptyPaymentReference;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for PaymentReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}

/// A payment the gateway has confirmed as captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedPayment {
    /// Captured amount in minor currency units.
    pub amount: u64,
    pub currency: String,
    pub reference: PaymentReference,
    pub paid_at: Timestamp,
}

/// Normalised outcome of asking the gateway about a payment reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The gateway confirmed the payment.
    Verified(VerifiedPayment),

    /// The gateway answered authoritatively that the payment did not succeed.
    NotVerified { reason: String },

    /// The gateway could not be reached or gave an unusable answer.
    TransportFailure { detail: String },
}

impl Verification {
    /// Whether asking again later may produce a different answer.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransportFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_trimmed() -> Result<(), EmptyPaymentReference> {
        let reference = PaymentReference::new("  pay_123\n")?;

        assert_eq!(reference.as_str(), "pay_123");
        assert_eq!(reference.to_string(), "pay_123");

        Ok(())
    }

    #[test]
    fn blank_references_are_rejected() {
        assert_eq!(PaymentReference::new(""), Err(EmptyPaymentReference));
        assert_eq!("   ".parse::<PaymentReference>(), Err(EmptyPaymentReference));
    }

    #[test]
    fn only_transport_failures_are_retryable() {
        let failure = Verification::TransportFailure {
            detail: "timed out".to_string(),
        };
        let rejected = Verification::NotVerified {
            reason: "card declined".to_string(),
        };

        assert!(failure.is_retryable());
        assert!(!rejected.is_retryable());
    }
}

//! Payment domain model.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Payment service errors.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// The request shape violates the contract (400).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Anything else unexpected (500).
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Payment method on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Placeholder; never a valid way to pay.
    #[serde(rename = "UNKNOWN")]
    Unknown,
    /// Debit card.
    #[serde(rename = "CARD")]
    Card,
    /// Instant bank transfer.
    #[serde(rename = "SBP")]
    Sbp,
    /// Credit card.
    #[serde(rename = "CREDIT_CARD")]
    CreditCard,
    /// Investor money.
    #[serde(rename = "INVESTOR_MONEY")]
    InvestorMoney,
}

impl PaymentMethod {
    /// Wire name of the method.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Card => "CARD",
            Self::Sbp => "SBP",
            Self::CreditCard => "CREDIT_CARD",
            Self::InvestorMoney => "INVESTOR_MONEY",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authorization request.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PayOrder {
    /// Order being paid.
    pub order_uuid: Uuid,
    /// Owner of the order.
    pub user_uuid: Uuid,
    /// Chosen payment method.
    pub payment_method: PaymentMethod,
}

impl PayOrder {
    /// Contract validation: both UUIDs must be non-nil and the method
    /// must be a real one.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::InvalidArgument`] naming the first
    /// violated field.
    pub fn validate(&self) -> Result<(), PaymentError> {
        if self.order_uuid.is_nil() {
            return Err(PaymentError::InvalidArgument(
                "order_uuid must be non-nil".into(),
            ));
        }
        if self.user_uuid.is_nil() {
            return Err(PaymentError::InvalidArgument(
                "user_uuid must be non-nil".into(),
            ));
        }
        if self.payment_method == PaymentMethod::Unknown {
            return Err(PaymentError::InvalidArgument(
                "payment_method must not be UNKNOWN".into(),
            ));
        }
        Ok(())
    }
}

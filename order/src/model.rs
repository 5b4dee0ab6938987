//! Order domain model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Payment method chosen by the customer.
///
/// `Unknown` is a legal wire value but never a valid way to pay; the
/// payment service rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Placeholder value; rejected on payment.
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

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNKNOWN" => Ok(Self::Unknown),
            "CARD" => Ok(Self::Card),
            "SBP" => Ok(Self::Sbp),
            "CREDIT_CARD" => Ok(Self::CreditCard),
            "INVESTOR_MONEY" => Ok(Self::InvestorMoney),
            other => Err(format!("unknown payment method {other:?}")),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order lifecycle status.
///
/// `Completed` and `Cancelled` are terminal: no transition leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, waiting for payment.
    #[serde(rename = "PENDING_PAYMENT")]
    PendingPayment,
    /// Payment authorized; waiting for assembly.
    #[serde(rename = "PAID")]
    Paid,
    /// Assembly finished.
    #[serde(rename = "COMPLETED")]
    Completed,
    /// Cancelled before payment.
    #[serde(rename = "CANCELLED")]
    Cancelled,
}

impl OrderStatus {
    /// Wire/storage name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingPayment => "PENDING_PAYMENT",
            Self::Paid => "PAID",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Whether the status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING_PAYMENT" => Ok(Self::PendingPayment),
            "PAID" => Ok(Self::Paid),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown order status {other:?}")),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The order aggregate.
///
/// `transaction_id` and `payment_method` are set together when the order
/// passes through `PAID` and are never cleared afterwards. `part_ids`
/// and `total_price` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    /// Unique identifier, assigned by persistence.
    pub id: Uuid,
    /// Owner of the order.
    pub user_id: Uuid,
    /// Parts the order is composed of; non-empty, immutable.
    pub part_ids: Vec<Uuid>,
    /// Total price in integer minor units (cents).
    pub total_price: i64,
    /// Payment transaction, present once paid.
    pub transaction_id: Option<Uuid>,
    /// Method the order was paid with, present once paid.
    pub payment_method: Option<PaymentMethod>,
    /// Current lifecycle status.
    pub status: OrderStatus,
}

/// Input to order creation.
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Owner of the new order.
    pub user_id: Uuid,
    /// Requested parts.
    pub part_ids: Vec<Uuid>,
}

/// Result of order creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateOrderResult {
    /// Assigned order id.
    pub id: Uuid,
    /// Total price in cents.
    pub total_price: i64,
}

/// Catalog projection the order service needs: just enough of a part to
/// price it and check stock.
#[derive(Debug, Clone, Deserialize)]
pub struct PartSummary {
    /// Part identifier.
    pub id: Uuid,
    /// Unit price in cents.
    pub price_cents: i64,
    /// Units currently in stock.
    pub stock_quantity: i64,
}

/// Render integer cents as a decimal with two fractional digits.
///
/// Never goes through a float; the sign is preserved for negative
/// amounts.
#[must_use]
pub fn format_price_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_rendering_keeps_two_digits() {
        assert_eq!(format_price_cents(5000), "50.00");
        assert_eq!(format_price_cents(5), "0.05");
        assert_eq!(format_price_cents(0), "0.00");
        assert_eq!(format_price_cents(12_500_050), "125000.50");
    }

    #[test]
    fn price_rendering_preserves_sign() {
        assert_eq!(format_price_cents(-5), "-0.05");
        assert_eq!(format_price_cents(-5000), "-50.00");
    }

    #[test]
    fn terminal_statuses() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::PendingPayment.is_terminal());
        assert!(!OrderStatus::Paid.is_terminal());
    }

    #[test]
    fn status_round_trips_through_storage_name() {
        for status in [
            OrderStatus::PendingPayment,
            OrderStatus::Paid,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
        assert!("ON_FIRE".parse::<OrderStatus>().is_err());
    }
}

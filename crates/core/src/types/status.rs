//! Status enums for checkout and transactions.

use serde::{Deserialize, Serialize};

/// Outcome of a payment confirmation attempt.
///
/// The wizard holds an `Option<PaymentStatus>`; `None` means no attempt has
/// been made in the current Payment step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Verification delay in progress.
    Pending,
    /// Verification finished without confirming the payment.
    Unsuccessful,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Unsuccessful => write!(f, "unsuccessful"),
        }
    }
}

/// Status written into a pending transaction record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[default]
    Pending,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_status_serde() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Unsuccessful).unwrap(),
            "\"unsuccessful\""
        );
        let parsed: PaymentStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Pending);
    }

    #[test]
    fn test_payment_status_display() {
        assert_eq!(PaymentStatus::Pending.to_string(), "pending");
        assert_eq!(PaymentStatus::Unsuccessful.to_string(), "unsuccessful");
    }

    #[test]
    fn test_transaction_status_default() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Pending);
        assert_eq!(
            serde_json::to_string(&TransactionStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}

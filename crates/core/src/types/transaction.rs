//! Pending transaction record.
//!
//! One record is written per confirm attempt. It is a log entry for manual
//! follow-up by the vendor, not a ledger row: nothing reads it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::contact::ContactInfo;
use super::status::TransactionStatus;

/// What was being bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    #[default]
    BuyCode,
}

/// An unverified manual payment attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount in whole currency units.
    pub amount: u64,
    pub status: TransactionStatus,
    pub meta: ContactInfo,
    pub created_at: DateTime<Utc>,
}

impl PendingTransaction {
    /// Create a `buy_code` record in the `pending` state.
    #[must_use]
    pub fn buy_code(amount: u64, meta: ContactInfo, created_at: DateTime<Utc>) -> Self {
        Self {
            kind: TransactionKind::BuyCode,
            amount,
            status: TransactionStatus::Pending,
            meta,
            created_at,
        }
    }
}

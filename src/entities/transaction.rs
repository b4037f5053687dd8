// 💳 Transaction Entity
// A sale attempt against a customer; status decides which metrics see it

use super::{match_label, ParseLabelError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// TRANSACTION STATUS
// ============================================================================

/// Mutually exclusive buckets: only `Completed` is revenue, only `Pending` is pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match_label(
            "transaction status",
            s,
            &[
                ("Completed", TransactionStatus::Completed),
                ("Pending", TransactionStatus::Pending),
                ("Failed", TransactionStatus::Failed),
            ],
        )
    }
}

// ============================================================================
// TRANSACTION ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    /// Weak reference: lookup only, may not resolve to a known customer
    pub customer_id: String,

    /// Denormalized for display
    pub customer_name: String,

    pub product: String,

    /// Non-negative, single currency unit throughout
    pub amount: f64,

    pub status: TransactionStatus,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        customer_name: impl Into<String>,
        product: impl Into<String>,
        amount: f64,
        status: TransactionStatus,
        date: NaiveDate,
    ) -> Self {
        Transaction {
            id: id.into(),
            customer_id: customer_id.into(),
            customer_name: customer_name.into(),
            product: product.into(),
            amount,
            status,
            date,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

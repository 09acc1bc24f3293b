use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Transaction {
    pub id: i64,
    pub wallet_address: String,
    pub status: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Fields supplied by a caller when recording a transaction. The id and
/// timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub wallet_address: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

/// Overwrites `status`, `type` and `value` of the transaction matching both
/// `id` and `wallet_address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    pub id: i64,
    pub wallet_address: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: f64,
}

impl NewTransaction {
    pub fn new(
        wallet_address: impl Into<String>,
        status: impl Into<String>,
        kind: impl Into<String>,
        value: f64,
    ) -> Self {
        NewTransaction {
            wallet_address: wallet_address.into(),
            status: status.into(),
            kind: kind.into(),
            value,
        }
    }
}

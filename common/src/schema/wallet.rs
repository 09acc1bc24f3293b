use serde::{Deserialize, Serialize};

/// A wallet row. Field names match the `wallets` columns, which is also the
/// JSON shape returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Wallet {
    pub address: String,
    pub walletbalance: f64,
    pub totalwithdrawable: f64,
}

impl Wallet {
    pub fn new(address: impl Into<String>, walletbalance: f64, totalwithdrawable: f64) -> Self {
        Wallet {
            address: address.into(),
            walletbalance,
            totalwithdrawable,
        }
    }
}

/// Which branch a wallet upsert took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

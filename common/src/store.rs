use async_trait::async_trait;

use crate::schema::{NewTransaction, Transaction, TransactionUpdate, UpsertOutcome, Wallet};

#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Inserts the wallet if the address is unseen, otherwise overwrites both
    /// balances.
    async fn upsert_wallet(
        &self,
        address: &str,
        balance: f64,
        withdrawable: f64,
    ) -> anyhow::Result<UpsertOutcome>;

    /// Returns `None` if no wallet with this address exists.
    async fn get_wallet(&self, address: &str) -> anyhow::Result<Option<Wallet>>;

    async fn get_all_wallets(&self) -> anyhow::Result<Vec<Wallet>>;

    /// Begin an all-or-nothing batch over the wallets table. Dropping the batch
    /// without committing discards its writes.
    async fn begin_batch<'a>(&'a self) -> anyhow::Result<Box<dyn WalletBatch + 'a>>;
}

/// A unit of work holding one reserved connection (or lock) until it is
/// committed or rolled back.
#[async_trait]
pub trait WalletBatch: Send {
    async fn get_all_wallets(&mut self) -> anyhow::Result<Vec<Wallet>>;

    async fn set_total_withdrawable(&mut self, address: &str, total: f64) -> anyhow::Result<()>;

    async fn commit(self: Box<Self>) -> anyhow::Result<()>;

    async fn rollback(self: Box<Self>) -> anyhow::Result<()>;
}

#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn add_transaction(&self, transaction: &NewTransaction) -> anyhow::Result<Transaction>;

    /// Returns the number of rows changed. Zero means no transaction matched
    /// the `(id, wallet_address)` pair, which is not an error.
    async fn update_transaction(&self, update: &TransactionUpdate) -> anyhow::Result<u64>;

    /// Newest first.
    async fn get_transactions_by_wallet(
        &self,
        wallet_address: &str,
    ) -> anyhow::Result<Vec<Transaction>>;
}

/// Everything the service needs from its backing store.
pub trait Store: WalletStore + TransactionStore {}

impl<T: WalletStore + TransactionStore> Store for T {}

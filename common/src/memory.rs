use anyhow::anyhow;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, MutexGuard};

use crate::schema::{NewTransaction, Transaction, TransactionUpdate, UpsertOutcome, Wallet};
use crate::store::{TransactionStore, WalletBatch, WalletStore};

#[derive(Default)]
struct Tables {
    wallets: Vec<Wallet>,
    transactions: Vec<Transaction>,
    next_transaction_id: i64,
}

/// Store kept entirely in process memory, mirroring the PostgreSQL semantics.
/// Used by tests and local runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    unavailable: bool,
    fail_update_for: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, as if the database were unreachable.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Make batch updates of `address` fail.
    pub fn fail_update_for(mut self, address: impl Into<String>) -> Self {
        self.fail_update_for = Some(address.into());
        self
    }

    pub async fn with_wallets(self, wallets: impl IntoIterator<Item = Wallet>) -> Self {
        self.tables.lock().await.wallets.extend(wallets);
        self
    }

    async fn tables(&self) -> anyhow::Result<MutexGuard<'_, Tables>> {
        if self.unavailable {
            return Err(anyhow!("memory store is unavailable"));
        }
        Ok(self.tables.lock().await)
    }
}

#[async_trait]
impl WalletStore for MemoryStore {
    async fn upsert_wallet(
        &self,
        address: &str,
        balance: f64,
        withdrawable: f64,
    ) -> anyhow::Result<UpsertOutcome> {
        let mut tables = self.tables().await?;
        if let Some(wallet) = tables.wallets.iter_mut().find(|w| w.address == address) {
            wallet.walletbalance = balance;
            wallet.totalwithdrawable = withdrawable;
            return Ok(UpsertOutcome::Updated);
        }
        tables
            .wallets
            .push(Wallet::new(address, balance, withdrawable));
        Ok(UpsertOutcome::Inserted)
    }

    async fn get_wallet(&self, address: &str) -> anyhow::Result<Option<Wallet>> {
        let tables = self.tables().await?;
        Ok(tables.wallets.iter().find(|w| w.address == address).cloned())
    }

    async fn get_all_wallets(&self) -> anyhow::Result<Vec<Wallet>> {
        Ok(self.tables().await?.wallets.clone())
    }

    async fn begin_batch<'a>(&'a self) -> anyhow::Result<Box<dyn WalletBatch + 'a>> {
        let tables = self.tables().await?;
        let staged = tables.wallets.clone();
        Ok(Box::new(MemoryWalletBatch {
            tables,
            staged,
            fail_update_for: self.fail_update_for.as_deref(),
        }))
    }
}

/// Holds the store lock for its whole lifetime; writes go to `staged` and are
/// published only by `commit`.
struct MemoryWalletBatch<'a> {
    tables: MutexGuard<'a, Tables>,
    staged: Vec<Wallet>,
    fail_update_for: Option<&'a str>,
}

#[async_trait]
impl WalletBatch for MemoryWalletBatch<'_> {
    async fn get_all_wallets(&mut self) -> anyhow::Result<Vec<Wallet>> {
        Ok(self.staged.clone())
    }

    async fn set_total_withdrawable(&mut self, address: &str, total: f64) -> anyhow::Result<()> {
        if self.fail_update_for == Some(address) {
            return Err(anyhow!("injected update failure for wallet {}", address));
        }
        if let Some(wallet) = self.staged.iter_mut().find(|w| w.address == address) {
            wallet.totalwithdrawable = total;
        }
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        let MemoryWalletBatch {
            mut tables, staged, ..
        } = *self;
        tables.wallets = staged;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn add_transaction(&self, transaction: &NewTransaction) -> anyhow::Result<Transaction> {
        let mut tables = self.tables().await?;
        tables.next_transaction_id += 1;
        let saved = Transaction {
            id: tables.next_transaction_id,
            wallet_address: transaction.wallet_address.clone(),
            status: transaction.status.clone(),
            kind: transaction.kind.clone(),
            value: transaction.value,
            timestamp: Utc::now(),
        };
        tables.transactions.push(saved.clone());
        Ok(saved)
    }

    async fn update_transaction(&self, update: &TransactionUpdate) -> anyhow::Result<u64> {
        let mut tables = self.tables().await?;
        let mut affected = 0;
        for transaction in tables
            .transactions
            .iter_mut()
            .filter(|t| t.id == update.id && t.wallet_address == update.wallet_address)
        {
            transaction.status = update.status.clone();
            transaction.kind = update.kind.clone();
            transaction.value = update.value;
            affected += 1;
        }
        Ok(affected)
    }

    async fn get_transactions_by_wallet(
        &self,
        wallet_address: &str,
    ) -> anyhow::Result<Vec<Transaction>> {
        let tables = self.tables().await?;
        let mut transactions: Vec<Transaction> = tables
            .transactions
            .iter()
            .filter(|t| t.wallet_address == wallet_address)
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
        Ok(transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_inserts_unseen_address() {
        let store = MemoryStore::new();
        let outcome = store.upsert_wallet("0xA", 100.0, 98.0).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Inserted);
        assert_eq!(
            store.get_wallet("0xA").await.unwrap(),
            Some(Wallet::new("0xA", 100.0, 98.0))
        );
    }

    #[tokio::test]
    async fn upsert_overwrites_both_balances() {
        let store = MemoryStore::new();
        store.upsert_wallet("0xA", 100.0, 98.0).await.unwrap();
        let outcome = store.upsert_wallet("0xA", 150.0, 0.0).await.unwrap();
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(
            store.get_wallet("0xA").await.unwrap(),
            Some(Wallet::new("0xA", 150.0, 0.0))
        );
        assert_eq!(store.get_all_wallets().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn missing_wallet_is_not_an_error() {
        let store = MemoryStore::new();
        assert_eq!(store.get_wallet("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn later_transaction_listed_first() {
        let store = MemoryStore::new();
        let first = store
            .add_transaction(&NewTransaction::new("0xA", "pending", "deposit", 10.0))
            .await
            .unwrap();
        let second = store
            .add_transaction(&NewTransaction::new("0xA", "pending", "deposit", 20.0))
            .await
            .unwrap();
        store
            .add_transaction(&NewTransaction::new("0xB", "pending", "deposit", 30.0))
            .await
            .unwrap();

        let listed = store.get_transactions_by_wallet("0xA").await.unwrap();
        assert_eq!(listed, vec![second, first]);
    }

    #[tokio::test]
    async fn update_requires_matching_wallet() {
        let store = MemoryStore::new();
        let saved = store
            .add_transaction(&NewTransaction::new("0xA", "pending", "deposit", 10.0))
            .await
            .unwrap();

        let mismatched = TransactionUpdate {
            id: saved.id,
            wallet_address: "0xB".to_string(),
            status: "done".to_string(),
            kind: "withdraw".to_string(),
            value: 1.0,
        };
        assert_eq!(store.update_transaction(&mismatched).await.unwrap(), 0);
        assert_eq!(
            store.get_transactions_by_wallet("0xA").await.unwrap(),
            vec![saved.clone()]
        );

        let matched = TransactionUpdate {
            wallet_address: "0xA".to_string(),
            ..mismatched
        };
        assert_eq!(store.update_transaction(&matched).await.unwrap(), 1);
        let updated = &store.get_transactions_by_wallet("0xA").await.unwrap()[0];
        assert_eq!(updated.status, "done");
        assert_eq!(updated.kind, "withdraw");
        assert_eq!(updated.value, 1.0);
        assert_eq!(updated.timestamp, saved.timestamp);
    }

    #[tokio::test]
    async fn dropped_batch_publishes_nothing() {
        let store = MemoryStore::new()
            .with_wallets([Wallet::new("0xA", 100.0, 0.0)])
            .await;
        {
            let mut batch = store.begin_batch().await.unwrap();
            batch.set_total_withdrawable("0xA", 5.0).await.unwrap();
        }
        assert_eq!(store.get_wallet("0xA").await.unwrap().unwrap().totalwithdrawable, 0.0);
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryStore::unavailable();
        assert!(store.get_wallet("0xA").await.is_err());
        assert!(store.upsert_wallet("0xA", 1.0, 1.0).await.is_err());
        assert!(store.get_transactions_by_wallet("0xA").await.is_err());
        assert!(store.begin_batch().await.is_err());
    }
}

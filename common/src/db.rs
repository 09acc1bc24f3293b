use anyhow::Context;
use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres,
    postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};

use crate::config::DbConfig;
use crate::schema::{NewTransaction, Transaction, TransactionUpdate, UpsertOutcome, Wallet};
use crate::store::{TransactionStore, WalletBatch, WalletStore};

const SELECT_WALLETS: &str = r#"
    SELECT
        address,
        walletbalance::float8 AS walletbalance,
        totalwithdrawable::float8 AS totalwithdrawable
    FROM wallets
"#;

const TRANSACTION_COLUMNS: &str = r#"
    id::int8 AS id,
    wallet_address,
    status,
    type,
    value::float8 AS value,
    "timestamp"::timestamptz AS "timestamp"
"#;

/// PostgreSQL-backed store. Cloning shares the underlying pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &DbConfig) -> anyhow::Result<Self> {
        // `Require` encrypts the connection but does not verify the server certificate.
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(&config.password)
            .database(&config.database)
            .ssl_mode(PgSslMode::Require);

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await
            .with_context(|| {
                format!(
                    "Failed to connect to database {} at {}:{}",
                    config.database, config.host, config.port
                )
            })?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WalletStore for Database {
    async fn upsert_wallet(
        &self,
        address: &str,
        balance: f64,
        withdrawable: f64,
    ) -> anyhow::Result<UpsertOutcome> {
        // xmax is zero only for a freshly inserted row version.
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO wallets (address, walletbalance, totalwithdrawable)
            VALUES ($1, $2, $3)
            ON CONFLICT (address) DO UPDATE
            SET walletbalance = EXCLUDED.walletbalance,
                totalwithdrawable = EXCLUDED.totalwithdrawable
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(address)
        .bind(balance)
        .bind(withdrawable)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert wallet {}", address))?;

        let outcome = if inserted {
            UpsertOutcome::Inserted
        } else {
            UpsertOutcome::Updated
        };
        log::debug!("Upserted wallet {}: {:?}", address, outcome);
        Ok(outcome)
    }

    async fn get_wallet(&self, address: &str) -> anyhow::Result<Option<Wallet>> {
        let wallet = sqlx::query_as::<_, Wallet>(&format!("{SELECT_WALLETS} WHERE address = $1"))
            .bind(address)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("Failed to get wallet {}", address))?;
        Ok(wallet)
    }

    async fn get_all_wallets(&self) -> anyhow::Result<Vec<Wallet>> {
        let wallets = sqlx::query_as::<_, Wallet>(SELECT_WALLETS)
            .fetch_all(&self.pool)
            .await
            .context("Failed to get all wallets from database")?;
        Ok(wallets)
    }

    async fn begin_batch<'a>(&'a self) -> anyhow::Result<Box<dyn WalletBatch + 'a>> {
        let transaction = self
            .pool
            .begin()
            .await
            .context("Failed to begin wallet batch")?;
        Ok(Box::new(PgWalletBatch { transaction }))
    }
}

/// Wallet batch bound to a single pooled connection inside `BEGIN ... COMMIT`.
/// sqlx rolls the transaction back if this is dropped uncommitted.
pub struct PgWalletBatch {
    transaction: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl WalletBatch for PgWalletBatch {
    async fn get_all_wallets(&mut self) -> anyhow::Result<Vec<Wallet>> {
        let wallets = sqlx::query_as::<_, Wallet>(SELECT_WALLETS)
            .fetch_all(&mut *self.transaction)
            .await
            .context("Failed to get wallets inside batch")?;
        Ok(wallets)
    }

    async fn set_total_withdrawable(&mut self, address: &str, total: f64) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE wallets
            SET totalwithdrawable = $1
            WHERE address = $2
            "#,
        )
        .bind(total)
        .bind(address)
        .execute(&mut *self.transaction)
        .await
        .with_context(|| format!("Failed to update totalwithdrawable for wallet {}", address))?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> anyhow::Result<()> {
        self.transaction
            .commit()
            .await
            .context("Failed to commit wallet batch")
    }

    async fn rollback(self: Box<Self>) -> anyhow::Result<()> {
        self.transaction
            .rollback()
            .await
            .context("Failed to roll back wallet batch")
    }
}

#[async_trait]
impl TransactionStore for Database {
    async fn add_transaction(&self, transaction: &NewTransaction) -> anyhow::Result<Transaction> {
        let saved = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            INSERT INTO transactions (wallet_address, status, type, value, "timestamp")
            VALUES ($1, $2, $3, $4, now())
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(&transaction.wallet_address)
        .bind(&transaction.status)
        .bind(&transaction.kind)
        .bind(transaction.value)
        .fetch_one(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to save transaction for wallet {}",
                transaction.wallet_address
            )
        })?;
        log::debug!("Saved transaction to database: {:?}", saved);
        Ok(saved)
    }

    async fn update_transaction(&self, update: &TransactionUpdate) -> anyhow::Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE transactions
            SET status = $1, type = $2, value = $3
            WHERE id = $4 AND wallet_address = $5
            "#,
        )
        .bind(&update.status)
        .bind(&update.kind)
        .bind(update.value)
        .bind(update.id)
        .bind(&update.wallet_address)
        .execute(&self.pool)
        .await
        .with_context(|| {
            format!(
                "Failed to update transaction {} for wallet {}",
                update.id, update.wallet_address
            )
        })?;
        Ok(result.rows_affected())
    }

    async fn get_transactions_by_wallet(
        &self,
        wallet_address: &str,
    ) -> anyhow::Result<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions
            WHERE wallet_address = $1
            ORDER BY "timestamp" DESC, id DESC
            "#
        ))
        .bind(wallet_address)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Failed to get transactions for wallet {}", wallet_address))?;
        Ok(transactions)
    }
}

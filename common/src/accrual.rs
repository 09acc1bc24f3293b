use anyhow::Context;
use chrono::{DateTime, Days, LocalResult, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::store::{WalletBatch, WalletStore};

/// Daily multiplier applied to `walletbalance` to obtain `totalwithdrawable`.
pub const ACCRUAL_FACTOR: f64 = 1.02;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccrualReport {
    pub wallets_updated: usize,
}

/// Recompute `totalwithdrawable` for every wallet in one batch.
///
/// Either every wallet is updated or, if any step fails, the batch is rolled
/// back and none are. The error is returned to the caller after the rollback.
pub async fn accrue_withdrawable<S>(store: &S) -> anyhow::Result<AccrualReport>
where
    S: WalletStore + ?Sized,
{
    let mut batch = store
        .begin_batch()
        .await
        .context("Failed to start accrual batch")?;

    match apply_accrual(batch.as_mut()).await {
        Ok(wallets_updated) => {
            batch.commit().await.context("Failed to commit accrual")?;
            Ok(AccrualReport { wallets_updated })
        }
        Err(e) => {
            if let Err(rollback_err) = batch.rollback().await {
                log::error!("Failed to roll back accrual batch: {:#}", rollback_err);
            }
            Err(e)
        }
    }
}

async fn apply_accrual(batch: &mut (dyn WalletBatch + '_)) -> anyhow::Result<usize> {
    let wallets = batch.get_all_wallets().await?;
    for wallet in &wallets {
        let total = wallet.walletbalance * ACCRUAL_FACTOR;
        batch.set_total_withdrawable(&wallet.address, total).await?;
        log::debug!(
            "Accrued wallet {}: walletbalance {} -> totalwithdrawable {}",
            wallet.address,
            wallet.walletbalance,
            total
        );
    }
    Ok(wallets.len())
}

/// The first local midnight in `tz` strictly after `now`.
pub fn next_midnight_after(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let mut date = now.with_timezone(&tz).date_naive();
    loop {
        date = date + Days::new(1);
        let midnight = date.and_time(NaiveTime::MIN);
        let candidate = match tz.from_local_datetime(&midnight) {
            LocalResult::Single(t) => t,
            LocalResult::Ambiguous(earliest, _) => earliest,
            // Zones that skip midnight for DST start the day at 01:00.
            LocalResult::None => {
                match tz.from_local_datetime(&(midnight + chrono::Duration::hours(1))) {
                    LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => t,
                    LocalResult::None => continue,
                }
            }
        };
        let candidate = candidate.with_timezone(&Utc);
        if candidate > now {
            return candidate;
        }
    }
}

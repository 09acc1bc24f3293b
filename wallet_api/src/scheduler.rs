use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use common::{Store, accrue_withdrawable, next_midnight_after};
use tokio::task::JoinHandle;

type Clock = Box<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Runs the withdrawable accrual once a day at local midnight in `timezone`.
pub struct AccrualScheduler {
    store: Arc<dyn Store>,
    timezone: Tz,
    clock: Clock,
}

impl AccrualScheduler {
    pub fn new(store: Arc<dyn Store>, timezone: Tz) -> Self {
        Self {
            store,
            timezone,
            clock: Box::new(Utc::now),
        }
    }

    #[cfg(test)]
    fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut next_run = next_midnight_after((self.clock)(), self.timezone);
        loop {
            log::info!(
                "Next balance accrual at {} ({})",
                next_run.with_timezone(&self.timezone),
                next_run
            );
            self.sleep_until(next_run).await;

            self.tick().await;

            // Never schedule the same midnight twice, even if the clock lags.
            next_run = next_midnight_after((self.clock)().max(next_run), self.timezone);
        }
    }

    /// Timers run on the monotonic clock, which can reach the deadline before a
    /// wall clock that was stepped back. Keep sleeping until the wall clock agrees.
    async fn sleep_until(&self, at: DateTime<Utc>) {
        while let Some(wait) = time_until((self.clock)(), at) {
            tokio::time::sleep(wait).await;
            if (self.clock)() < at {
                log::debug!("Woke before {} by the wall clock, sleeping again", at);
            }
        }
    }

    /// One scheduled run. Failures are logged and left for the next tick.
    pub async fn tick(&self) {
        log::info!("Balance accrual started");
        match accrue_withdrawable(&*self.store).await {
            Ok(report) => log::info!(
                "Balance accrual committed for {} wallets",
                report.wallets_updated
            ),
            Err(e) => log::error!("Balance accrual rolled back: {:#}", e),
        }
    }
}

fn time_until(now: DateTime<Utc>, at: DateTime<Utc>) -> Option<Duration> {
    (at - now).to_std().ok().filter(|wait| !wait.is_zero())
}

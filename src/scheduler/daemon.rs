use std::time::Duration;

use tokio::{task::JoinHandle, time::sleep};
use tracing::{error, info};

use crate::scheduler::{RunError, Scheduler, Trigger};

/// 一定間隔で再投稿ランを起動する常駐タスクを立ち上げる。
///
/// 初回のランも1周期待ってから始める。実行中に周期が来た場合は
/// スケジューラ側で拒否されるので、この場でスキップ扱いにする。
pub fn spawn_interval_daemon(scheduler: Scheduler, interval: Duration) -> JoinHandle<()> {
    IntervalDaemon::new(scheduler, interval).spawn()
}

struct IntervalDaemon {
    scheduler: Scheduler,
    interval: Duration,
}

impl IntervalDaemon {
    fn new(scheduler: Scheduler, interval: Duration) -> Self {
        Self {
            scheduler,
            interval,
        }
    }

    fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(self) {
        loop {
            info!(
                wait_seconds = self.interval.as_secs(),
                "scheduled next repost run"
            );
            sleep(self.interval).await;

            match self.scheduler.run_once(Trigger::Interval).await {
                Ok(outcome) => info!(?outcome, "interval repost run finished"),
                Err(RunError::Busy) => info!("interval repost run skipped: already in flight"),
                Err(err) => error!(error = %err, "interval repost run failed"),
            }
        }
    }
}

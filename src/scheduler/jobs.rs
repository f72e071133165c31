use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    observability::metrics::Metrics,
    pipeline::{PipelineError, RepostPipeline, RunOutcome},
};

/// 実行のきっかけ。ログの区別に使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Trigger {
    Interval,
    Manual,
}

impl Trigger {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Trigger::Interval => "interval",
            Trigger::Manual => "manual",
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum RunError {
    #[error("a repost run is already in flight")]
    Busy,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// 再投稿ランを直列化するスケジューラ。
///
/// 定期実行と手動トリガーが同じインスタンスを共有し、実行中の
/// 追加要求は待たせずに [`RunError::Busy`] で拒否する。
#[derive(Clone)]
pub struct Scheduler {
    pipeline: Arc<RepostPipeline>,
    run_lock: Arc<Mutex<()>>,
    metrics: Arc<Metrics>,
}

impl Scheduler {
    pub(crate) fn new(pipeline: Arc<RepostPipeline>, metrics: Arc<Metrics>) -> Self {
        Self {
            pipeline,
            run_lock: Arc::new(Mutex::new(())),
            metrics,
        }
    }

    /// パイプラインを1回実行する。
    pub(crate) async fn run_once(&self, trigger: Trigger) -> Result<RunOutcome, RunError> {
        let Ok(_guard) = self.run_lock.try_lock() else {
            self.metrics.runs_rejected_busy.inc();
            tracing::warn!(trigger = trigger.as_str(), "run rejected: already in flight");
            return Err(RunError::Busy);
        };

        let run_id = Uuid::new_v4();
        tracing::info!(%run_id, trigger = trigger.as_str(), "repost run started");
        let started = Instant::now();

        let result = self.pipeline.run().await;
        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.run_duration.observe(elapsed);

        match &result {
            Ok(RunOutcome::Published { item_id, status_id }) => {
                self.metrics.runs_published.inc();
                tracing::info!(
                    %run_id,
                    item_id = %item_id,
                    status_id = %status_id,
                    duration_secs = elapsed,
                    "repost run published a status"
                );
            }
            Ok(RunOutcome::NoCandidate) => {
                self.metrics.runs_no_candidate.inc();
                tracing::info!(%run_id, duration_secs = elapsed, "repost run found no candidate");
            }
            Err(err) => {
                self.metrics.runs_failed.inc();
                if matches!(err, PipelineError::Publish(_)) {
                    self.metrics.publish_failures.inc();
                }
                tracing::error!(%run_id, error = %err, duration_secs = elapsed, "repost run failed");
            }
        }

        result.map_err(RunError::from)
    }

    /// 単発実行の入口。制御プレーンを立てない1回きりのランに使う。
    ///
    /// # Errors
    ///
    /// ランが失敗した場合はその原因を返す。
    pub async fn run_manual(&self) -> anyhow::Result<()> {
        self.run_once(Trigger::Manual).await?;
        Ok(())
    }
}

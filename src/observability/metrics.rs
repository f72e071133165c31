//! Prometheusメトリクス定義。

use prometheus::{
    Counter, Gauge, Histogram, Registry, register_counter_with_registry,
    register_gauge_with_registry, register_histogram_with_registry,
};
use std::sync::Arc;

/// メトリクスコレクター。
#[derive(Debug, Clone)]
pub struct Metrics {
    // カウンター
    pub runs_published: Counter,
    pub runs_no_candidate: Counter,
    pub runs_failed: Counter,
    pub runs_rejected_busy: Counter,
    pub publish_failures: Counter,

    // ヒストグラム
    pub run_duration: Histogram,
    pub message_chars: Histogram,

    // ゲージ
    pub ledger_size: Gauge,
}

impl Metrics {
    /// 新しいメトリクスコレクターを作成する。
    pub(crate) fn new(registry: Arc<Registry>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            runs_published: register_counter_with_registry!(
                "repost_runs_published_total",
                "Runs that published a status",
                registry
            )?,
            runs_no_candidate: register_counter_with_registry!(
                "repost_runs_no_candidate_total",
                "Runs that found no eligible thread",
                registry
            )?,
            runs_failed: register_counter_with_registry!(
                "repost_runs_failed_total",
                "Runs that ended with an error",
                registry
            )?,
            runs_rejected_busy: register_counter_with_registry!(
                "repost_runs_rejected_busy_total",
                "Run requests rejected because another run was in flight",
                registry
            )?,
            publish_failures: register_counter_with_registry!(
                "repost_publish_failures_total",
                "Publish attempts rejected or failed by the microblog",
                registry
            )?,
            run_duration: register_histogram_with_registry!(
                "repost_run_duration_seconds",
                "Duration of a full repost run",
                registry
            )?,
            message_chars: register_histogram_with_registry!(
                "repost_message_chars",
                "Character count of composed status messages",
                registry
            )?,
            ledger_size: register_gauge_with_registry!(
                "repost_ledger_size",
                "Number of source item ids recorded in the publication ledger",
                registry
            )?,
        })
    }
}

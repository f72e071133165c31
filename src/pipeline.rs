//! 再投稿パイプライン本体。候補選定から投稿・台帳記録までを1回分実行する。

use std::sync::Arc;

use aho_corasick::BuildError;
use thiserror::Error;

use crate::{
    clients::feed::FeedItem,
    clients::{FeedSource, PublishError, Publisher},
    config::Config,
    ledger::PublicationLedger,
    observability::metrics::Metrics,
};

pub(crate) mod compose;
pub(crate) mod normalize;
pub(crate) mod prompt;
pub(crate) mod summary;

use prompt::{IndexSource, PromptGenerator};
use summary::SummaryExtractor;

/// 1回分の実行結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RunOutcome {
    /// ステータスを1件投稿した。
    Published { item_id: String, status_id: String },
    /// 投稿できるスレッドが見つからなかった。正常系として扱う。
    NoCandidate,
}

/// パイプライン実行の失敗区分。
#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error("community feed unavailable: {0}")]
    Feed(anyhow::Error),
    #[error("failed to publish the composed status")]
    Publish(#[from] PublishError),
}

/// フィード取得からステータス投稿までを直列に実行するパイプライン。
pub(crate) struct RepostPipeline {
    config: Arc<Config>,
    feed: Arc<dyn FeedSource>,
    publisher: Arc<dyn Publisher>,
    summary: SummaryExtractor,
    prompts: PromptGenerator,
    metrics: Arc<Metrics>,
}

impl RepostPipeline {
    pub(crate) fn new(
        config: Arc<Config>,
        feed: Arc<dyn FeedSource>,
        publisher: Arc<dyn Publisher>,
        index_source: Arc<dyn IndexSource>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, BuildError> {
        let summary = SummaryExtractor::new(config.low_signal_markers())?;
        let prompts = PromptGenerator::new(index_source);
        Ok(Self {
            config,
            feed,
            publisher,
            summary,
            prompts,
            metrics,
        })
    }

    /// ホット一覧から未投稿スレッドを1件選び、整形して投稿する。
    ///
    /// 台帳は実行のたびに読み直す。投稿が成功した場合のみ台帳へ記録し、
    /// 記録の失敗は警告ログに留めて成功として返す。
    pub(crate) async fn run(&self) -> Result<RunOutcome, PipelineError> {
        let mut ledger = PublicationLedger::load(self.config.ledger_path());
        let items = self
            .feed
            .list_hot(self.config.channel(), self.config.fetch_limit().get())
            .await
            .map_err(PipelineError::Feed)?;
        tracing::debug!(candidates = items.len(), "fetched hot listing");

        let Some(item) = Self::select_candidate(&ledger, &items) else {
            tracing::info!("no eligible thread in the current listing");
            return Ok(RunOutcome::NoCandidate);
        };

        let summary = self.summary.extract(item);
        let prompt = self.prompts.prompt_for(&item.title);
        let message = compose::compose_message(
            &item.title,
            summary.as_deref(),
            &prompt,
            &item.permalink,
            self.config.message_limit(),
        );
        self.observe_message(&message);

        // 連続アクセスを避けるため、投稿前に一呼吸置く。
        let delay = self.config.publish_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let status_id = self.publisher.publish(&message).await?;
        if let Err(err) = ledger.record(&item.id) {
            tracing::warn!(error = ?err, item_id = %item.id, "publication ledger write failed");
        }
        self.observe_ledger(&ledger);
        tracing::info!(item_id = %item.id, status_id = %status_id, "status published");

        Ok(RunOutcome::Published {
            item_id: item.id.clone(),
            status_id,
        })
    }

    /// 一覧の並び順を保ったまま、ピン留めと投稿済みを除いた先頭を返す。
    /// 選定の根拠を追えるよう、候補全件の判定内容をdebugログに残す。
    fn select_candidate<'a>(
        ledger: &PublicationLedger,
        items: &'a [FeedItem],
    ) -> Option<&'a FeedItem> {
        let mut selected = None;
        for item in items {
            let already_published = ledger.contains(&item.id);
            tracing::debug!(
                item_id = %item.id,
                title = %item.title,
                score = item.score,
                sticky = item.sticky,
                already_published,
                "candidate disposition"
            );
            if selected.is_none() && !item.sticky && !already_published {
                selected = Some(item);
            }
        }
        selected
    }

    #[allow(clippy::cast_precision_loss)]
    fn observe_message(&self, message: &str) {
        self.metrics
            .message_chars
            .observe(message.chars().count() as f64);
    }

    #[allow(clippy::cast_precision_loss)]
    fn observe_ledger(&self, ledger: &PublicationLedger) {
        self.metrics.ledger_size.set(ledger.len() as f64);
    }
}

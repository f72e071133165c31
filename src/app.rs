use std::sync::Arc;

use anyhow::Result;
use axum::Router;

use crate::{
    api,
    clients::{
        CommunityFeedClient, CommunityFeedConfig, FeedSource, MicroblogClient, MicroblogConfig,
        Publisher,
    },
    config::Config,
    observability::Telemetry,
    pipeline::RepostPipeline,
    pipeline::prompt::ThreadRngIndexSource,
    scheduler::Scheduler,
};

#[derive(Clone)]
pub(crate) struct AppState {
    registry: Arc<ComponentRegistry>,
}

pub struct ComponentRegistry {
    config: Arc<Config>,
    telemetry: Telemetry,
    scheduler: Scheduler,
    feed_client: Arc<CommunityFeedClient>,
    microblog_client: Arc<MicroblogClient>,
}

impl AppState {
    pub(crate) fn new(registry: ComponentRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub(crate) fn telemetry(&self) -> &Telemetry {
        &self.registry.telemetry
    }

    pub(crate) fn scheduler(&self) -> &Scheduler {
        &self.registry.scheduler
    }

    pub(crate) fn config(&self) -> &Config {
        &self.registry.config
    }

    pub(crate) fn feed_client(&self) -> Arc<CommunityFeedClient> {
        Arc::clone(&self.registry.feed_client)
    }

    pub(crate) fn microblog_client(&self) -> Arc<MicroblogClient> {
        Arc::clone(&self.registry.microblog_client)
    }
}

impl ComponentRegistry {
    /// 構成情報と依存をまとめて初期化し、アプリケーションの共有レジストリを構築する。
    ///
    /// # Errors
    /// Telemetry の初期化、HTTP クライアント構築、パイプライン構築が失敗した場合はエラーを返す。
    pub fn build(config: Config) -> Result<Self> {
        let config = Arc::new(config);
        let telemetry = Telemetry::new()?;
        let feed_client = Arc::new(CommunityFeedClient::new(CommunityFeedConfig {
            base_url: config.feed_base_url().to_string(),
            connect_timeout: config.feed_connect_timeout(),
            total_timeout: config.feed_total_timeout(),
            service_token: config.feed_service_token().map(ToString::to_string),
        })?);
        let microblog_client = Arc::new(MicroblogClient::new(MicroblogConfig {
            base_url: config.microblog_base_url().to_string(),
            connect_timeout: config.microblog_connect_timeout(),
            total_timeout: config.microblog_total_timeout(),
            access_token: config.microblog_access_token().to_string(),
        })?);
        let metrics = telemetry.metrics_arc();
        let pipeline = Arc::new(RepostPipeline::new(
            Arc::clone(&config),
            Arc::clone(&feed_client) as Arc<dyn FeedSource>,
            Arc::clone(&microblog_client) as Arc<dyn Publisher>,
            Arc::new(ThreadRngIndexSource),
            Arc::clone(&metrics),
        )?);
        let scheduler = Scheduler::new(pipeline, metrics);

        Ok(Self {
            config,
            telemetry,
            scheduler,
            feed_client,
            microblog_client,
        })
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}

/// レジストリを共有状態に包み、制御プレーンのルーターを組み立てる。
#[must_use]
pub fn build_router(registry: ComponentRegistry) -> Router {
    let state = AppState::new(registry);
    api::router(state)
}

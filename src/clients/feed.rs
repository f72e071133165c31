//! コミュニティフィードゲートウェイから人気スレッドを取得するクライアント。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

/// フィードから取得したスレッドのスナップショット。実行中だけ保持し、永続化しない。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct FeedItem {
    pub(crate) id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) score: i64,
    #[serde(default)]
    pub(crate) sticky: bool,
    pub(crate) permalink: String,
    #[serde(default)]
    pub(crate) replies: Vec<Reply>,
}

/// スレッドへの返信。並びはフィードの表示順のまま。
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct Reply {
    pub(crate) body: String,
    #[serde(default)]
    pub(crate) from_submitter: bool,
    #[serde(default)]
    pub(crate) stickied: bool,
}

#[derive(Debug, Deserialize)]
struct HotListingResponse {
    items: Vec<FeedItem>,
}

/// フィード読み取りの抽象。テストではフェイクに差し替える。
#[async_trait]
pub(crate) trait FeedSource: Send + Sync {
    /// 指定チャネルの人気スレッドを、提供側の並び順のまま最大 `limit` 件返す。
    async fn list_hot(&self, channel: &str, limit: usize) -> Result<Vec<FeedItem>>;
}

/// フィードクライアントの設定。
#[derive(Debug, Clone)]
pub(crate) struct CommunityFeedConfig {
    pub(crate) base_url: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) total_timeout: Duration,
    pub(crate) service_token: Option<String>,
}

/// フィードゲートウェイとの通信を管理するクライアント。
#[derive(Debug, Clone)]
pub(crate) struct CommunityFeedClient {
    client: Client,
    base_url: Url,
    service_token: Option<String>,
}

impl CommunityFeedClient {
    /// 新しいフィードクライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返す。
    pub(crate) fn new(config: CommunityFeedConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build community-feed HTTP client")?;

        let base_url = Url::parse(&config.base_url).context("invalid community-feed base URL")?;

        Ok(Self {
            client,
            base_url,
            service_token: config.service_token,
        })
    }

    /// チャネル情報エンドポイントを呼び、フィード側の生存を確かめる。
    ///
    /// # Errors
    /// リクエストが失敗した場合、またはエラーステータスが返った場合はエラーを返す。
    pub(crate) async fn ping(&self, channel: &str) -> Result<()> {
        let url = self
            .base_url
            .join(&format!("v1/channels/{channel}/about"))
            .context("failed to build channel about URL")?;

        let mut request = self.client.get(url);
        if let Some(ref token) = self.service_token {
            request = request.header("X-Service-Token", token);
        }

        request
            .send()
            .await
            .context("community-feed about request failed")?
            .error_for_status()
            .context("community-feed about endpoint returned error status")?;

        Ok(())
    }
}

#[async_trait]
impl FeedSource for CommunityFeedClient {
    async fn list_hot(&self, channel: &str, limit: usize) -> Result<Vec<FeedItem>> {
        let mut url = self
            .base_url
            .join(&format!("v1/channels/{channel}/hot"))
            .context("failed to build hot listing URL")?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());

        let mut request = self.client.get(url);
        if let Some(ref token) = self.service_token {
            request = request.header("X-Service-Token", token);
        }

        let response = request
            .send()
            .await
            .context("community-feed hot listing request failed")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!("community-feed returned error status {status}: {error_body}");
        }

        let listing: HotListingResponse = response
            .json()
            .await
            .context("failed to deserialize community-feed hot listing")?;

        debug!(channel, items = listing.items.len(), "fetched hot listing");

        Ok(listing.items)
    }
}

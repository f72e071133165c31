//! マイクロブログゲートウェイへステータスを投稿するクライアント。

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 投稿失敗の型付き区分。再試行の判断はせず、呼び出し側に委ねる。
#[derive(Debug, Error)]
pub(crate) enum PublishError {
    #[error("microblog rejected the status: rate limited")]
    RateLimited,
    #[error("microblog rejected the credentials")]
    Unauthorized,
    #[error("microblog forbade the operation")]
    Forbidden,
    #[error("microblog request failed")]
    Network(#[from] reqwest::Error),
}

/// 投稿先の抽象。テストではフェイクに差し替える。
#[async_trait]
pub(crate) trait Publisher: Send + Sync {
    /// テキストを1件投稿し、発行されたステータスIDを返す。
    async fn publish(&self, text: &str) -> Result<String, PublishError>;
}

/// マイクロブログクライアントの設定。
#[derive(Debug, Clone)]
pub(crate) struct MicroblogConfig {
    pub(crate) base_url: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) total_timeout: Duration,
    pub(crate) access_token: String,
}

#[derive(Debug, Serialize)]
struct PublishRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct PublishResponse {
    id: String,
}

/// マイクロブログゲートウェイとの通信を管理するクライアント。
#[derive(Debug, Clone)]
pub(crate) struct MicroblogClient {
    client: Client,
    publish_url: Url,
    verify_url: Url,
    access_token: String,
}

impl MicroblogClient {
    /// 新しいマイクロブログクライアントを作成する。
    ///
    /// # Errors
    /// URLのパースまたはHTTPクライアントの構築に失敗した場合はエラーを返す。
    pub(crate) fn new(config: MicroblogConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.total_timeout)
            .build()
            .context("failed to build microblog HTTP client")?;

        let base_url = Url::parse(&config.base_url).context("invalid microblog base URL")?;
        let publish_url = base_url
            .join("v1/statuses")
            .context("failed to build statuses URL")?;
        let verify_url = base_url
            .join("v1/credentials/verify")
            .context("failed to build credentials URL")?;

        Ok(Self {
            client,
            publish_url,
            verify_url,
            access_token: config.access_token,
        })
    }

    /// 設定済みトークンが投稿に使えるかを確かめる。
    ///
    /// # Errors
    /// リクエストが失敗した場合、または資格情報が拒否された場合はエラーを返す。
    pub(crate) async fn verify_credentials(&self) -> Result<()> {
        self.client
            .get(self.verify_url.clone())
            .bearer_auth(&self.access_token)
            .send()
            .await
            .context("microblog credentials request failed")?
            .error_for_status()
            .context("microblog rejected the configured credentials")?;

        Ok(())
    }
}

#[async_trait]
impl Publisher for MicroblogClient {
    async fn publish(&self, text: &str) -> Result<String, PublishError> {
        let response = self
            .client
            .post(self.publish_url.clone())
            .bearer_auth(&self.access_token)
            .json(&PublishRequest { text })
            .send()
            .await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(PublishError::RateLimited),
            StatusCode::UNAUTHORIZED => Err(PublishError::Unauthorized),
            StatusCode::FORBIDDEN => Err(PublishError::Forbidden),
            _ => {
                let accepted = response.error_for_status()?;
                let body: PublishResponse = accepted.json().await?;
                Ok(body.id)
            }
        }
    }
}

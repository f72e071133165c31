use std::{env, net::SocketAddr, num::NonZeroUsize, path::PathBuf, time::Duration};

use thiserror::Error;

#[cfg(test)]
use once_cell::sync::Lazy;
#[cfg(test)]
pub(crate) static ENV_MUTEX: Lazy<std::sync::Mutex<()>> = Lazy::new(|| std::sync::Mutex::new(()));

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    http_bind: SocketAddr,
    feed_base_url: String,
    feed_service_token: Option<String>,
    feed_connect_timeout: Duration,
    feed_total_timeout: Duration,
    microblog_base_url: String,
    microblog_access_token: String,
    microblog_connect_timeout: Duration,
    microblog_total_timeout: Duration,
    channel: String,
    fetch_limit: NonZeroUsize,
    message_limit: usize,
    ledger_path: PathBuf,
    run_interval: Duration,
    publish_delay: Duration,
    low_signal_markers: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {source}")]
    Invalid {
        name: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Config {
    /// 環境変数から Repost Worker の設定値を読み込み、検証する。
    ///
    /// # Errors
    /// `COMMUNITY_FEED_BASE_URL` や `MICROBLOG_*` が未設定、もしくは各種値の
    /// パースに失敗した場合は [`ConfigError`] を返す。
    pub fn from_env() -> Result<Self, ConfigError> {
        let http_bind = parse_socket_addr("REPOST_WORKER_HTTP_BIND", "0.0.0.0:9007")?;

        let feed_base_url = env_var("COMMUNITY_FEED_BASE_URL")?;
        let feed_service_token = env::var("COMMUNITY_FEED_SERVICE_TOKEN").ok();
        let feed_connect_timeout = parse_duration_ms("COMMUNITY_FEED_CONNECT_TIMEOUT_MS", 3000)?;
        let feed_total_timeout = parse_duration_ms("COMMUNITY_FEED_TOTAL_TIMEOUT_MS", 15000)?;

        let microblog_base_url = env_var("MICROBLOG_BASE_URL")?;
        let microblog_access_token = env_var("MICROBLOG_ACCESS_TOKEN")?;
        let microblog_connect_timeout = parse_duration_ms("MICROBLOG_CONNECT_TIMEOUT_MS", 3000)?;
        let microblog_total_timeout = parse_duration_ms("MICROBLOG_TOTAL_TIMEOUT_MS", 15000)?;

        let channel =
            env::var("REPOST_CHANNEL").unwrap_or_else(|_| "BestofRedditorUpdates".to_string());
        let fetch_limit = parse_non_zero_usize("REPOST_FETCH_LIMIT", 20)?;
        let message_limit = parse_usize("REPOST_MESSAGE_LIMIT", 280)?;
        let ledger_path = PathBuf::from(
            env::var("REPOST_LEDGER_PATH").unwrap_or_else(|_| "posted_threads.json".to_string()),
        );
        let run_interval = parse_duration_secs("REPOST_INTERVAL_SECS", 900)?;
        let publish_delay = parse_duration_secs("REPOST_PUBLISH_DELAY_SECS", 2)?;
        let low_signal_markers = parse_csv("REPOST_LOW_SIGNAL_MARKERS", "lol,lmao,lmfao,rofl,haha");

        Ok(Self {
            http_bind,
            feed_base_url,
            feed_service_token,
            feed_connect_timeout,
            feed_total_timeout,
            microblog_base_url,
            microblog_access_token,
            microblog_connect_timeout,
            microblog_total_timeout,
            channel,
            fetch_limit,
            message_limit,
            ledger_path,
            run_interval,
            publish_delay,
            low_signal_markers,
        })
    }

    #[must_use]
    pub fn http_bind(&self) -> SocketAddr {
        self.http_bind
    }

    #[must_use]
    pub fn feed_base_url(&self) -> &str {
        &self.feed_base_url
    }

    #[must_use]
    pub fn feed_service_token(&self) -> Option<&str> {
        self.feed_service_token.as_deref()
    }

    #[must_use]
    pub fn feed_connect_timeout(&self) -> Duration {
        self.feed_connect_timeout
    }

    #[must_use]
    pub fn feed_total_timeout(&self) -> Duration {
        self.feed_total_timeout
    }

    #[must_use]
    pub fn microblog_base_url(&self) -> &str {
        &self.microblog_base_url
    }

    #[must_use]
    pub fn microblog_access_token(&self) -> &str {
        &self.microblog_access_token
    }

    #[must_use]
    pub fn microblog_connect_timeout(&self) -> Duration {
        self.microblog_connect_timeout
    }

    #[must_use]
    pub fn microblog_total_timeout(&self) -> Duration {
        self.microblog_total_timeout
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn fetch_limit(&self) -> NonZeroUsize {
        self.fetch_limit
    }

    #[must_use]
    pub fn message_limit(&self) -> usize {
        self.message_limit
    }

    #[must_use]
    pub fn ledger_path(&self) -> &std::path::Path {
        &self.ledger_path
    }

    #[must_use]
    pub fn run_interval(&self) -> Duration {
        self.run_interval
    }

    #[must_use]
    pub fn publish_delay(&self) -> Duration {
        self.publish_delay
    }

    #[must_use]
    pub fn low_signal_markers(&self) -> &[String] {
        &self.low_signal_markers
    }
}

fn env_var(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parse_socket_addr(name: &'static str, default: &str) -> Result<SocketAddr, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());

    raw.parse().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_non_zero_usize(name: &'static str, default: usize) -> Result<NonZeroUsize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    let parsed = raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })?;
    NonZeroUsize::new(parsed).ok_or_else(|| ConfigError::Invalid {
        name,
        source: anyhow::anyhow!("must be greater than zero"),
    })
}

fn parse_usize(name: &'static str, default: usize) -> Result<usize, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<usize>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_u64(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.parse::<u64>().map_err(|error| ConfigError::Invalid {
        name,
        source: anyhow::Error::new(error),
    })
}

fn parse_duration_secs(name: &'static str, default_secs: u64) -> Result<Duration, ConfigError> {
    let value = parse_u64(name, default_secs)?;
    Ok(Duration::from_secs(value))
}

fn parse_duration_ms(name: &'static str, default_ms: u64) -> Result<Duration, ConfigError> {
    let ms = parse_u64(name, default_ms)?;
    Ok(Duration::from_millis(ms))
}

fn parse_csv(name: &'static str, default: &str) -> Vec<String> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

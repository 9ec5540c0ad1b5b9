//! Page fetching seam for the script miner.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use echobot_core::config::MinerConfig;

use crate::error::BotError;

/// Fetches a page and returns its body as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, BotError>;
}

/// HTTP fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &MinerConfig) -> Result<Self, BotError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, BotError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Fetch(format!("{} returned {}", url, status)));
        }
        Ok(response.text().await?)
    }
}

/// Fetcher used when mining is disabled. Every request fails.
pub struct NoopFetcher;

#[async_trait]
impl PageFetcher for NoopFetcher {
    async fn fetch(&self, url: &str) -> Result<String, BotError> {
        Err(BotError::Fetch(format!("fetching disabled: {}", url)))
    }
}

/// Serves canned pages keyed by URL prefix. Unknown URLs fail.
///
/// Useful for replaying saved transcripts without network access.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    pages: HashMap<String, String>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for any URL starting with `prefix`.
    pub fn with_page(mut self, prefix: impl Into<String>, body: impl Into<String>) -> Self {
        self.pages.insert(prefix.into(), body.into());
        self
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<String, BotError> {
        self.pages
            .iter()
            .filter(|(prefix, _)| url.starts_with(prefix.as_str()))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, body)| body.clone())
            .ok_or_else(|| BotError::Fetch(format!("no canned page for {}", url)))
    }
}

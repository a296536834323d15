//! Backend contract and configuration.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Page, Result, SearchError};

/// Configuration shared by every backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Short user-facing region code ("jp", "us", ...). Empty means none.
    #[serde(default)]
    pub region: String,
    /// Per-call deadline in seconds. Zero disables it.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Overrides the adapter's built-in browser User-Agent.
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_timeout() -> u64 {
    10
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            region: String::new(),
            timeout: default_timeout(),
            user_agent: None,
        }
    }
}

impl BackendConfig {
    /// Creates a config with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the region code.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Sets the per-call deadline in seconds.
    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets a custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Returns the deadline, or `None` when disabled.
    pub fn deadline(&self) -> Option<Duration> {
        (self.timeout > 0).then(|| Duration::from_secs(self.timeout))
    }
}

/// Trait every search engine adapter implements.
///
/// A caller builds one backend per session, calls [`Backend::search`] for the
/// first page, then moves with [`Backend::next_page`] and
/// [`Backend::prev_page`], always passing the same query text.
///
/// Stateful backends allow at most one call in flight per instance; build a
/// second instance for concurrent work.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Stable lowercase engine name.
    fn name(&self) -> &str;

    /// Fetches page 1 for `query`.
    async fn search(&self, query: &str) -> Result<Page>;

    /// Fetches the page after `prev`.
    ///
    /// Fails with [`SearchError::NoMorePages`] when `prev.has_more` is false
    /// or the continuation state a stateful backend needs is missing.
    async fn next_page(&self, prev: &Page, query: &str) -> Result<Page>;

    /// Rebuilds page `target_page_num`. Targets of 1 or below act like `search`.
    async fn prev_page(&self, query: &str, target_page_num: u32) -> Result<Page>;
}

/// Rejects queries that are empty after trimming.
pub(crate) fn validate_query(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(SearchError::InvalidQuery("Query cannot be empty".into()));
    }
    Ok(())
}

/// Runs `fut` under an optional deadline.
pub(crate) async fn with_deadline<T, F>(deadline: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| SearchError::Timeout)?,
        None => fut.await,
    }
}

//! Error types for search backends.

use thiserror::Error;

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors surfaced by a backend call.
///
/// Backends never retry internally; every failure is returned to the caller,
/// which decides whether to wait, retry, or give up.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Request construction or network failure.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The engine answered with a non-success status.
    #[error("search returned status {0}")]
    UnexpectedStatus(u16),

    /// The engine is throttling us (HTTP 429 or 503).
    #[error("rate limit triggered (status {0}), try again later")]
    RateLimited(u16),

    /// An anti-automation challenge was served instead of results.
    #[error("bot detection triggered, wait a moment and try again")]
    BotDetected,

    /// `next_page` was called on the last page or without continuation state.
    #[error("no more pages")]
    NoMorePages,

    /// Invalid query.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The per-call deadline elapsed.
    #[error("Search timeout exceeded")]
    Timeout,

    /// Another call is already in flight on this backend instance.
    #[error("backend session is busy with another request")]
    SessionBusy,

    /// No backend is registered under this name.
    #[error("Unknown engine: {0}")]
    UnknownBackend(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SearchError {
    /// Returns true when waiting and retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SearchError::RateLimited(_) | SearchError::BotDetected | SearchError::Timeout
        )
    }

    /// Returns true when the caller broke the backend contract.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            SearchError::NoMorePages | SearchError::InvalidQuery(_) | SearchError::SessionBusy
        )
    }
}

/// Maps an HTTP status to the matching error, or `Ok` for 2xx.
pub(crate) fn check_status(status: u16) -> Result<()> {
    match status {
        200..=299 => Ok(()),
        429 | 503 => Err(SearchError::RateLimited(status)),
        _ => Err(SearchError::UnexpectedStatus(status)),
    }
}

//! HTTP-based page fetcher using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use tracing::debug;

use crate::fetcher::{FetchRequest, FetchResponse, Method, PageFetcher};
use crate::{Result, SearchError};

/// Accept header a desktop Firefox sends for a top-level navigation.
pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Accept-Language matching an `en-US` desktop browser.
pub const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.5";

/// A page fetcher that sends plain HTTP requests via reqwest.
///
/// Every request carries browser-like `Accept` and `Accept-Language` headers.
/// A fetcher built with [`HttpFetcher::with_cookies`] keeps a cookie store for
/// its whole lifetime, so cookies issued on first contact are presented on
/// every later request made through the same instance.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a cookie-less fetcher.
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        Self::build(user_agent, timeout, false)
    }

    /// Creates a fetcher with its own cookie store.
    pub fn with_cookies(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        Self::build(user_agent, timeout, true)
    }

    /// Creates an `HttpFetcher` with a custom reqwest client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn build(user_agent: &str, timeout: Option<Duration>, cookies: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));

        let mut builder = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .cookie_store(cookies);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse> {
        debug!(method = ?request.method, url = %request.url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        // `form` replaces any Content-Type set above instead of appending a second one.
        if request.method == Method::Post {
            builder = builder.form(&request.form);
        }

        let response = builder.send().await.map_err(map_transport)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_transport)?;

        debug!(status, bytes = body.len(), "response received");
        Ok(FetchResponse { status, body })
    }
}

fn map_transport(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Timeout
    } else {
        SearchError::Transport(err)
    }
}

//! Page fetcher abstraction for retrieving engine HTML.

use async_trait::async_trait;

use crate::Result;

/// HTTP method of a fetch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Query-string request.
    Get,
    /// Form-encoded request body.
    Post,
}

/// Everything an adapter needs sent for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL, including the query string for GET requests.
    pub url: String,
    /// Form fields sent as `application/x-www-form-urlencoded` on POST.
    pub form: Vec<(String, String)>,
    /// Extra request headers beyond the fetcher's defaults.
    pub headers: Vec<(String, String)>,
}

impl FetchRequest {
    /// Creates a GET request.
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            form: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Creates a form POST request.
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            form,
            headers: Vec::new(),
        }
    }

    /// Adds a request header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the value of the first form field named `name`.
    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw response handed back to the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Decoded response body.
    pub body: String,
}

impl FetchResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Trait for sending an adapter's request and returning status plus HTML.
///
/// Implementations own the HTTP session (headers, cookies, timeouts). A
/// non-success status is not an error at this layer; adapters classify it.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Sends the request and returns the raw response.
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse>;
}

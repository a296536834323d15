//! Brave search engine implementation.
//!
//! Brave paginates by offset: the page index is itself a query parameter,
//! so every page can be requested directly and the adapter keeps no session.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::backend::{validate_query, with_deadline};
use crate::error::check_status;
use crate::extract::{parse_selector, SelectorChain};
use crate::fetcher::{FetchRequest, PageFetcher};
use crate::fetcher_http::HttpFetcher;
use crate::region::BRAVE_REGIONS;
use crate::{Backend, BackendConfig, Page, Result, SearchError, SearchResult};

const ENDPOINT: &str = "https://search.brave.com/search";
const ENGINE_DOMAIN: &str = "brave.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:133.0) Gecko/20100101 Firefox/133.0";

/// Result count at which we assume another page exists even without a pager link.
const PAGE_SIZE: usize = 10;

const TITLE_CHAIN: &[&str] = &["div.search-snippet-title", "a.title"];
const SNIPPET_CHAIN: &[&str] = &[
    "div.generic-snippet .content",
    "div.description",
    "p.snippet-description",
];

struct Selectors {
    results: Selector,
    results_fallback: Selector,
    links: Selector,
    title: SelectorChain,
    snippet: SelectorChain,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            results: parse_selector(r#"div.snippet[data-type="web"]"#)?,
            results_fallback: parse_selector("div.snippet[data-pos]")?,
            links: parse_selector("a[href]")?,
            title: SelectorChain::new(TITLE_CHAIN)?,
            snippet: SelectorChain::new(SNIPPET_CHAIN)?,
        })
    }
}

/// Brave search backend.
pub struct Brave {
    config: BackendConfig,
    fetcher: Arc<dyn PageFetcher>,
    selectors: Selectors,
}

impl Brave {
    /// Creates a Brave backend with its own HTTP client.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);
        let fetcher = HttpFetcher::new(user_agent, config.deadline())?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a Brave backend that sends requests through `fetcher`.
    pub fn with_fetcher(config: BackendConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            config,
            fetcher,
            selectors: Selectors::new()?,
        })
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn build_request(&self, query: &str, offset: u32) -> Result<FetchRequest> {
        let mut params = vec![("q", query.to_string()), ("source", "web".to_string())];
        if let Some(country) = BRAVE_REGIONS.resolve(&self.config.region) {
            params.push(("country", country));
        }
        if offset > 0 {
            params.push(("offset", offset.to_string()));
        }
        let url = Url::parse_with_params(ENDPOINT, &params)?;
        Ok(FetchRequest::get(url.to_string()))
    }

    async fn fetch_page(&self, query: &str, offset: u32, page_num: u32) -> Result<Page> {
        let request = self.build_request(query, offset)?;
        debug!(engine = "brave", page_num, offset, "fetching page");

        let response = self.fetcher.fetch(request).await?;
        if let Err(err) = check_status(response.status) {
            warn!(engine = "brave", status = response.status, "search request rejected");
            return Err(err);
        }

        let page = self.parse_page(&response.body, page_num);
        debug!(
            engine = "brave",
            page_num,
            results = page.results.len(),
            has_more = page.has_more,
            "page parsed"
        );
        Ok(page)
    }

    fn parse_page(&self, html: &str, page_num: u32) -> Page {
        let document = Html::parse_document(html);
        let mut page = Page::new(page_num);

        let mut blocks: Vec<ElementRef<'_>> = document.select(&self.selectors.results).collect();
        if blocks.is_empty() {
            blocks = document.select(&self.selectors.results_fallback).collect();
        }
        page.results = blocks
            .into_iter()
            .filter_map(|block| self.extract_result(block))
            .collect();

        let has_offset_link = document
            .select(&self.selectors.links)
            .filter_map(|a| a.value().attr("href"))
            .any(|href| href.contains("offset="));
        page.has_more = has_offset_link || page.results.len() >= PAGE_SIZE;

        page
    }

    fn extract_result(&self, block: ElementRef<'_>) -> Option<SearchResult> {
        let title = self.selectors.title.first_text(block)?;

        let url = block
            .select(&self.selectors.links)
            .filter_map(|a| a.value().attr("href"))
            .find(|href| is_external_link(href))?;

        let snippet = self.selectors.snippet.first_text(block).unwrap_or_default();

        Some(SearchResult::new(title, url, snippet))
    }
}

/// True for absolute http(s) links that leave Brave's own domain.
fn is_external_link(href: &str) -> bool {
    let Ok(url) = Url::parse(href) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host_str() {
        Some(host) => host != ENGINE_DOMAIN && !host.ends_with(".brave.com"),
        None => false,
    }
}

#[async_trait]
impl Backend for Brave {
    fn name(&self) -> &str {
        "brave"
    }

    async fn search(&self, query: &str) -> Result<Page> {
        validate_query(query)?;
        with_deadline(self.config.deadline(), self.fetch_page(query, 0, 1)).await
    }

    async fn next_page(&self, prev: &Page, query: &str) -> Result<Page> {
        if !prev.has_more {
            return Err(SearchError::NoMorePages);
        }
        validate_query(query)?;
        // Brave's offset is the 0-indexed page, i.e. the previous page's number.
        with_deadline(
            self.config.deadline(),
            self.fetch_page(query, prev.page_num, prev.page_num + 1),
        )
        .await
    }

    async fn prev_page(&self, query: &str, target_page_num: u32) -> Result<Page> {
        if target_page_num <= 1 {
            return self.search(query).await;
        }
        validate_query(query)?;
        with_deadline(
            self.config.deadline(),
            self.fetch_page(query, target_page_num - 1, target_page_num),
        )
        .await
    }
}

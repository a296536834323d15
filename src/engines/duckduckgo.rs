//! DuckDuckGo search engine implementation.
//!
//! Uses the JavaScript-free endpoint at `html.duckduckgo.com`. Pagination is
//! token based: every results page embeds a form whose hidden inputs are the
//! exact fields of the next request. We capture them into the page's
//! [`ContinuationState`](crate::ContinuationState) and replay them verbatim,
//! swapping in only the query text.
//!
//! The engine sets anti-automation cookies on first contact, so each instance
//! owns one cookie-carrying fetcher and only one call may use it at a time.

use std::sync::Arc;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::form_urlencoded;

use crate::backend::{validate_query, with_deadline};
use crate::error::check_status;
use crate::extract::{element_text, parse_selector};
use crate::fetcher::{FetchRequest, FetchResponse, PageFetcher};
use crate::fetcher_http::HttpFetcher;
use crate::region::DUCKDUCKGO_REGIONS;
use crate::{Backend, BackendConfig, Page, Result, SearchError, SearchResult};

const ENDPOINT: &str = "https://html.duckduckgo.com/html/";
const REFERER: &str = "https://html.duckduckgo.com/";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64; rv:138.0) Gecko/20100101 Firefox/138.0";
const REDIRECT_PATH: &str = "//duckduckgo.com/l/?";

struct Selectors {
    challenge: Selector,
    results: Selector,
    title_link: Selector,
    snippet: Selector,
    nav_form: Selector,
    hidden_input: Selector,
    submit_input: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            challenge: parse_selector("form#challenge-form")?,
            results: parse_selector(".result.results_links")?,
            title_link: parse_selector(".result__title a.result__a")?,
            snippet: parse_selector(".result__snippet")?,
            nav_form: parse_selector(".nav-link form")?,
            hidden_input: parse_selector("input[type='hidden']")?,
            submit_input: parse_selector("input[type='submit']")?,
        })
    }
}

/// The per-instance HTTP session.
struct Session {
    fetcher: Arc<dyn PageFetcher>,
}

/// DuckDuckGo HTML search backend.
pub struct DuckDuckGo {
    config: BackendConfig,
    session: Mutex<Session>,
    selectors: Selectors,
}

impl DuckDuckGo {
    /// Creates a DuckDuckGo backend with its own cookie-carrying HTTP client.
    pub fn new(config: BackendConfig) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(USER_AGENT);
        let fetcher = HttpFetcher::with_cookies(user_agent, config.deadline())?;
        Self::with_fetcher(config, Arc::new(fetcher))
    }

    /// Creates a DuckDuckGo backend that sends requests through `fetcher`.
    ///
    /// The fetcher becomes this instance's session; share it with nothing else.
    pub fn with_fetcher(config: BackendConfig, fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        Ok(Self {
            config,
            session: Mutex::new(Session { fetcher }),
            selectors: Selectors::new()?,
        })
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    async fn first_page(&self, session: &Session, query: &str) -> Result<Page> {
        let mut form = vec![("q".to_string(), query.to_string())];
        if let Some(kl) = DUCKDUCKGO_REGIONS.resolve(&self.config.region) {
            form.push(("kl".to_string(), kl));
        }
        self.fetch_page(session, form, 1).await
    }

    async fn following_page(&self, session: &Session, prev: &Page, query: &str) -> Result<Page> {
        if !prev.has_more || prev.continuation.is_empty() {
            return Err(SearchError::NoMorePages);
        }
        let mut state = prev.continuation.clone();
        state.set("q", query);
        self.fetch_page(session, state.into_fields(), prev.page_num + 1)
            .await
    }

    /// Re-walks from page 1 towards `target`, stopping early on the last page.
    async fn replay(&self, session: &Session, query: &str, target: u32) -> Result<Page> {
        let mut page = self.first_page(session, query).await?;
        for _ in 1..target {
            if !page.has_more || page.continuation.is_empty() {
                warn!(
                    engine = "duckduckgo",
                    requested = target,
                    reached = page.page_num,
                    "results ended before the requested page, returning the last one"
                );
                return Ok(page);
            }
            page = self.following_page(session, &page, query).await?;
        }
        Ok(page)
    }

    async fn fetch_page(
        &self,
        session: &Session,
        form: Vec<(String, String)>,
        page_num: u32,
    ) -> Result<Page> {
        debug!(
            engine = "duckduckgo",
            page_num,
            fields = form.len(),
            "fetching page"
        );
        let request = FetchRequest::post_form(ENDPOINT, form)
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("Referer", REFERER);

        let response = session.fetcher.fetch(request).await?;
        let page = self.read_response(&response, page_num)?;
        debug!(
            engine = "duckduckgo",
            page_num,
            results = page.results.len(),
            has_more = page.has_more,
            "page parsed"
        );
        Ok(page)
    }

    /// Classifies the response and extracts the page.
    ///
    /// The challenge check runs before the status check; the challenge page
    /// may arrive with any status.
    fn read_response(&self, response: &FetchResponse, page_num: u32) -> Result<Page> {
        let document = Html::parse_document(&response.body);

        if document.select(&self.selectors.challenge).next().is_some() {
            warn!(engine = "duckduckgo", status = response.status, "challenge page served");
            return Err(SearchError::BotDetected);
        }
        if let Err(err) = check_status(response.status) {
            warn!(engine = "duckduckgo", status = response.status, "search request rejected");
            return Err(err);
        }

        Ok(self.parse_page(&document, page_num))
    }

    fn parse_page(&self, document: &Html, page_num: u32) -> Page {
        let mut page = Page::new(page_num);

        page.results = document
            .select(&self.selectors.results)
            .filter_map(|block| self.extract_result(block))
            .collect();

        if let Some(form) = self.next_form(document) {
            page.has_more = true;
            for input in form.select(&self.selectors.hidden_input) {
                let name = input.value().attr("name").unwrap_or_default();
                if !name.is_empty() {
                    let value = input.value().attr("value").unwrap_or_default();
                    page.continuation.set(name, value);
                }
            }
        }

        page
    }

    fn extract_result(&self, block: ElementRef<'_>) -> Option<SearchResult> {
        let anchor = block.select(&self.selectors.title_link).next()?;
        let title = element_text(anchor);
        let url = unwrap_redirect(anchor.value().attr("href").unwrap_or_default());
        if title.is_empty() || url.is_empty() {
            return None;
        }

        let snippet = block
            .select(&self.selectors.snippet)
            .next()
            .map(element_text)
            .unwrap_or_default();

        Some(SearchResult::new(title, url, snippet))
    }

    /// Picks the pager form, preferring the one whose button reads "Next".
    ///
    /// Without a "Next" button the first pager form is taken, which on a last
    /// page may be the "Previous" form.
    fn next_form<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        let forms: Vec<_> = document.select(&self.selectors.nav_form).collect();
        forms
            .iter()
            .copied()
            .find(|form| {
                form.select(&self.selectors.submit_input).any(|input| {
                    input
                        .value()
                        .attr("value")
                        .is_some_and(|label| label.contains("Next"))
                })
            })
            .or_else(|| {
                let first = forms.first().copied();
                if first.is_some() {
                    debug!(
                        engine = "duckduckgo",
                        forms = forms.len(),
                        "no Next pager form, falling back to the first pager form"
                    );
                }
                first
            })
    }

    fn lock_session(&self) -> Result<tokio::sync::MutexGuard<'_, Session>> {
        self.session
            .try_lock()
            .map_err(|_| SearchError::SessionBusy)
    }
}

/// Recovers the destination of a `//duckduckgo.com/l/?uddg=` redirect link.
///
/// The query string is form-decoded, so `+` reads as a space. Anything that is
/// not such a link, or whose `uddg` value is missing or empty, is returned
/// unchanged.
fn unwrap_redirect(href: &str) -> String {
    let relative = href.strip_prefix("https:").unwrap_or(href);
    let Some(query) = relative.strip_prefix(REDIRECT_PATH) else {
        return href.to_string();
    };
    form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "uddg")
        .map(|(_, target)| target.into_owned())
        .filter(|target| !target.is_empty())
        .unwrap_or_else(|| href.to_string())
}

#[async_trait]
impl Backend for DuckDuckGo {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str) -> Result<Page> {
        validate_query(query)?;
        let session = self.lock_session()?;
        with_deadline(self.config.deadline(), self.first_page(&session, query)).await
    }

    async fn next_page(&self, prev: &Page, query: &str) -> Result<Page> {
        if !prev.has_more || prev.continuation.is_empty() {
            return Err(SearchError::NoMorePages);
        }
        validate_query(query)?;
        let session = self.lock_session()?;
        with_deadline(
            self.config.deadline(),
            self.following_page(&session, prev, query),
        )
        .await
    }

    async fn prev_page(&self, query: &str, target_page_num: u32) -> Result<Page> {
        if target_page_num <= 1 {
            return self.search(query).await;
        }
        validate_query(query)?;
        let session = self.lock_session()?;
        with_deadline(
            self.config.deadline(),
            self.replay(&session, query, target_page_num),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::fake::FakeFetcher;
    use crate::fetcher::Method;
    use std::time::Duration;
    use crate::ContinuationState;

    fn result_block(title: &str, href: &str, snippet: &str) -> String {
        format!(
            r#"<div class="result results_links results_links_deep web-result">
                <h2 class="result__title"><a class="result__a" href="{href}">{title}</a></h2>
                <a class="result__snippet" href="{href}">{snippet}</a>
            </div>"#
        )
    }

    fn next_form(offset: u32) -> String {
        format!(
            r#"<div class="nav-link">
                <form action="/html/" method="post">
                    <input type="submit" class="btn" value="Next" />
                    <input type="hidden" name="q" value="old query" />
                    <input type="hidden" name="s" value="{offset}" />
                    <input type="hidden" name="nextParams" value="" />
                    <input type="hidden" name="v" value="l" />
                    <input type="hidden" name="dc" value="{dc}" />
                </form>
            </div>"#,
            dc = offset + 1
        )
    }

    fn results_page(count: usize, next_offset: Option<u32>) -> String {
        let mut body = String::from("<html><body>");
        for i in 0..count {
            body.push_str(&result_block(
                &format!("Result {i}"),
                &format!("//duckduckgo.com/l/?uddg=https%3A%2F%2Fsite{i}.example.com%2F&rut=abc"),
                "snippet text",
            ));
        }
        if let Some(offset) = next_offset {
            body.push_str(&next_form(offset));
        }
        body.push_str("</body></html>");
        body
    }

    const CHALLENGE: &str = r#"<html><body>
        <form id="challenge-form" action="/anomaly" method="post">
            <input type="hidden" name="cc" value="botnet" />
        </form>
        <div class="result results_links">
            <h2 class="result__title"><a class="result__a" href="https://leak.example.com/">Leak</a></h2>
        </div>
    </body></html>"#;

    fn ddg_with(fetcher: &Arc<FakeFetcher>, config: BackendConfig) -> DuckDuckGo {
        DuckDuckGo::with_fetcher(config, fetcher.clone()).unwrap()
    }

    fn parse(html: &str) -> Page {
        let engine = ddg_with(&Arc::new(FakeFetcher::default()), BackendConfig::default());
        engine.parse_page(&Html::parse_document(html), 1)
    }

    fn last_page(page_num: u32) -> Page {
        Page::new(page_num)
    }

    #[test]
    fn test_duckduckgo_name() {
        let engine = ddg_with(&Arc::new(FakeFetcher::default()), BackendConfig::default());
        assert_eq!(engine.name(), "duckduckgo");
    }

    #[test]
    fn test_duckduckgo_new() {
        let engine = DuckDuckGo::new(BackendConfig::new().with_region("us")).unwrap();
        assert_eq!(engine.config().region, "us");
    }

    #[test]
    fn test_unwrap_redirect() {
        assert_eq!(
            unwrap_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fx"),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_unwrap_redirect_drops_tracking_params() {
        assert_eq!(
            unwrap_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fpage&rut=abc"),
            "https://example.com/page"
        );
    }

    #[test]
    fn test_unwrap_redirect_with_scheme() {
        assert_eq!(
            unwrap_redirect("https://duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2F"),
            "https://example.com/"
        );
    }

    #[test]
    fn test_unwrap_redirect_passes_through_direct_links() {
        assert_eq!(unwrap_redirect("https://example.com/a"), "https://example.com/a");
    }

    #[test]
    fn test_unwrap_redirect_passes_through_malformed() {
        let empty = "//duckduckgo.com/l/?uddg=&rut=abc";
        assert_eq!(unwrap_redirect(empty), empty);
        let missing = "//duckduckgo.com/l/?rut=abc";
        assert_eq!(unwrap_redirect(missing), missing);
    }

    #[test]
    fn test_unwrap_redirect_decodes_plus_as_space() {
        assert_eq!(
            unwrap_redirect("//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com%2Fa+b&rut=abc"),
            "https://example.com/a b"
        );
    }

    #[test]
    fn test_unwrap_redirect_finds_uddg_after_other_params() {
        assert_eq!(
            unwrap_redirect("//duckduckgo.com/l/?kh=-1&uddg=https%3A%2F%2Fexample.com%2F"),
            "https://example.com/"
        );
    }

    #[test]
    fn test_parse_results() {
        let page = parse(&results_page(3, None));
        assert_eq!(page.results.len(), 3);
        assert_eq!(page.results[0].title, "Result 0");
        assert_eq!(page.results[0].url, "https://site0.example.com/");
        assert_eq!(page.results[0].snippet, "snippet text");
        assert_eq!(page.results[2].url, "https://site2.example.com/");
    }

    #[test]
    fn test_parse_discards_incomplete_blocks() {
        let html = r#"<html><body>
            <div class="result results_links">
                <h2 class="result__title"><a class="result__a" href="">No Href</a></h2>
            </div>
            <div class="result results_links">
                <h2 class="result__title"><a class="result__a" href="https://example.com/"> </a></h2>
            </div>
            <div class="result results_links">
                <div class="result__snippet">orphan snippet</div>
            </div>
            <div class="result results_links">
                <h2 class="result__title"><a class="result__a" href="https://ok.example.com/">Kept</a></h2>
            </div>
        </body></html>"#;
        let page = parse(html);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].title, "Kept");
        assert_eq!(page.results[0].snippet, "");
    }

    #[test]
    fn test_parse_last_page_has_no_continuation() {
        let page = parse(&results_page(5, None));
        assert!(!page.has_more);
        assert!(page.continuation.is_empty());
    }

    #[test]
    fn test_parse_captures_hidden_fields_in_order() {
        let page = parse(&results_page(2, Some(30)));
        assert!(page.has_more);
        let fields: Vec<_> = page.continuation.iter().collect();
        assert_eq!(
            fields,
            vec![
                ("q", "old query"),
                ("s", "30"),
                ("nextParams", ""),
                ("v", "l"),
                ("dc", "31"),
            ]
        );
    }

    #[test]
    fn test_parse_prefers_next_form_over_previous() {
        let html = r#"<html><body>
            <div class="nav-link">
                <form action="/html/" method="post">
                    <input type="submit" class="btn btn--alt" value="&lt; Previous" />
                    <input type="hidden" name="s" value="0" />
                </form>
            </div>
            <div class="nav-link">
                <form action="/html/" method="post">
                    <input type="submit" class="btn btn--alt" value="Next" />
                    <input type="hidden" name="s" value="60" />
                </form>
            </div>
        </body></html>"#;
        let page = parse(html);
        assert!(page.has_more);
        assert_eq!(page.continuation.get("s"), Some("60"));
    }

    #[test]
    fn test_parse_falls_back_to_first_pager_form() {
        let html = r#"<html><body>
            <div class="nav-link">
                <form action="/html/" method="post">
                    <input type="submit" class="btn btn--alt" value="&lt; Previous" />
                    <input type="hidden" name="s" value="0" />
                </form>
            </div>
        </body></html>"#;
        let page = parse(html);
        assert!(page.has_more);
        assert_eq!(page.continuation.get("s"), Some("0"));
    }

    #[test]
    fn test_parse_skips_unnamed_hidden_inputs() {
        let html = r#"<div class="nav-link"><form>
            <input type="hidden" value="nameless" />
            <input type="hidden" name="s" value="30" />
            <input type="text" name="visible" value="x" />
        </form></div>"#;
        let page = parse(html);
        assert_eq!(page.continuation.len(), 1);
        assert_eq!(page.continuation.get("s"), Some("30"));
    }

    #[tokio::test]
    async fn test_search_posts_query_with_browser_headers() {
        let fetcher = Arc::new(FakeFetcher::html(&[results_page(2, Some(30))]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let page = engine.search("rust").await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].url, ENDPOINT);
        assert_eq!(requests[0].form, vec![("q".to_string(), "rust".to_string())]);
        assert!(requests[0]
            .headers
            .contains(&("Referer".to_string(), REFERER.to_string())));
        assert!(requests[0].headers.contains(&(
            "Content-Type".to_string(),
            "application/x-www-form-urlencoded".to_string()
        )));
        assert_eq!(page.page_num, 1);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_search_sends_mapped_region() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::new().with_region("jp"));

        engine.search("sushi").await.unwrap();

        assert_eq!(fetcher.requests()[0].form_value("kl"), Some("jp-jp"));
    }

    #[tokio::test]
    async fn test_search_doubles_unmapped_region() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::new().with_region("zz"));

        engine.search("sushi").await.unwrap();

        assert_eq!(fetcher.requests()[0].form_value("kl"), Some("zz-zz"));
    }

    #[tokio::test]
    async fn test_search_without_region_omits_kl() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::default());

        engine.search("sushi").await.unwrap();

        assert_eq!(fetcher.requests()[0].form_value("kl"), None);
    }

    #[tokio::test]
    async fn test_next_page_replays_continuation_with_new_query() {
        let fetcher = Arc::new(FakeFetcher::html(&[results_page(2, None)]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let prev = parse(&results_page(2, Some(30)));
        let page = engine.next_page(&prev, "rust lang").await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(
            requests[0].form,
            vec![
                ("q".to_string(), "rust lang".to_string()),
                ("s".to_string(), "30".to_string()),
                ("nextParams".to_string(), String::new()),
                ("v".to_string(), "l".to_string()),
                ("dc".to_string(), "31".to_string()),
            ]
        );
        assert_eq!(page.page_num, 2);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_next_page_appends_query_when_not_captured() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let mut prev = Page::new(1);
        prev.has_more = true;
        prev.continuation = {
            let mut state = ContinuationState::new();
            state.set("s", "30");
            state
        };
        engine.next_page(&prev, "rust").await.unwrap();

        let form = &fetcher.requests()[0].form;
        assert_eq!(form[0], ("s".to_string(), "30".to_string()));
        assert_eq!(form[1], ("q".to_string(), "rust".to_string()));
    }

    #[tokio::test]
    async fn test_next_page_on_last_page_fails() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let err = engine.next_page(&last_page(3), "rust").await.unwrap_err();

        assert!(matches!(err, SearchError::NoMorePages));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_next_page_without_continuation_fails() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let mut prev = Page::new(1);
        prev.has_more = true;
        let err = engine.next_page(&prev, "rust").await.unwrap_err();

        assert!(matches!(err, SearchError::NoMorePages));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_challenge_is_bot_detected_even_on_success_status() {
        let fetcher = Arc::new(FakeFetcher::html(&[CHALLENGE]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let err = engine.search("rust").await.unwrap_err();

        assert!(matches!(err, SearchError::BotDetected));
    }

    #[tokio::test]
    async fn test_challenge_checked_before_status() {
        let fetcher = Arc::new(FakeFetcher::new(vec![FetchResponse::new(403, CHALLENGE)]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let err = engine.search("rust").await.unwrap_err();

        assert!(matches!(err, SearchError::BotDetected));
    }

    #[tokio::test]
    async fn test_rate_limited_and_unexpected_status() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            FetchResponse::new(429, "slow down"),
            FetchResponse::new(418, "teapot"),
        ]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let first = engine.search("rust").await.unwrap_err();
        let second = engine.search("rust").await.unwrap_err();

        assert!(matches!(first, SearchError::RateLimited(429)));
        assert!(matches!(second, SearchError::UnexpectedStatus(418)));
    }

    #[tokio::test]
    async fn test_empty_results_are_not_an_error() {
        let fetcher = Arc::new(FakeFetcher::html(&[
            "<html><body><p>No results.</p></body></html>",
        ]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let page = engine.search("zxqv").await.unwrap();

        assert!(page.results.is_empty());
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_prev_page_one_behaves_like_search() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::new().with_region("de"));

        engine.search("rust").await.unwrap();
        engine.prev_page("rust", 1).await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_prev_page_replays_to_target() {
        let fetcher = Arc::new(FakeFetcher::html(&[
            results_page(10, Some(10)),
            results_page(10, Some(40)),
            results_page(10, Some(70)),
        ]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let page = engine.prev_page("rust", 3).await.unwrap();

        let requests = fetcher.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].form_value("s"), None);
        assert_eq!(requests[1].form_value("s"), Some("10"));
        assert_eq!(requests[2].form_value("s"), Some("40"));
        assert_eq!(page.page_num, 3);
        assert!(page.has_more);
    }

    #[tokio::test]
    async fn test_prev_page_stops_early_when_results_run_out() {
        let fetcher = Arc::new(FakeFetcher::html(&[
            results_page(10, Some(10)),
            results_page(10, Some(40)),
            results_page(4, None),
        ]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let page = engine.prev_page("rust", 5).await.unwrap();

        assert_eq!(page.page_num, 3);
        assert_eq!(page.results.len(), 4);
        assert!(!page.has_more);
        assert_eq!(fetcher.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_prev_page_propagates_mid_replay_failure() {
        let fetcher = Arc::new(FakeFetcher::new(vec![
            FetchResponse::new(200, results_page(10, Some(10))),
            FetchResponse::new(200, CHALLENGE),
        ]));
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let err = engine.prev_page("rust", 4).await.unwrap_err();

        assert!(matches!(err, SearchError::BotDetected));
    }

    #[tokio::test]
    async fn test_slow_replay_times_out() {
        let fetcher = Arc::new(
            FakeFetcher::html(&[results_page(10, Some(10)), results_page(10, Some(40))])
                .with_delay(Duration::from_millis(700)),
        );
        let engine = ddg_with(&fetcher, BackendConfig::new().with_timeout(1));

        let err = engine.prev_page("rust", 3).await.unwrap_err();

        assert!(matches!(err, SearchError::Timeout));
        assert_eq!(fetcher.requests().len(), 2);
        engine.session.try_lock().unwrap();
    }

    #[tokio::test]
    async fn test_overlapping_call_is_rejected() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::default());

        let _held = engine.session.try_lock().unwrap();
        let err = engine.search("rust").await.unwrap_err();

        assert!(matches!(err, SearchError::SessionBusy));
        assert!(fetcher.requests().is_empty());
    }

    #[tokio::test]
    async fn test_session_released_after_call() {
        let fetcher = Arc::new(FakeFetcher::default());
        let engine = ddg_with(&fetcher, BackendConfig::default());

        engine.search("rust").await.unwrap();
        engine.search("rust").await.unwrap();

        assert_eq!(fetcher.requests().len(), 2);
    }
}

//! # ksk
//!
//! Page through web search results from engines that offer no query API.
//!
//! Each engine is wrapped in a [`Backend`] that scrapes its HTML into a common
//! [`Page`] model and hides how the engine paginates:
//!
//! - [`engines::Brave`] pages by offset, so any page is one request away.
//! - [`engines::DuckDuckGo`] hands back the next request's form fields in
//!   every page; the backend replays them and keeps a cookie session.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ksk::{Backend, BackendConfig, Registry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = Registry::with_defaults().create("ddg", BackendConfig::new().with_region("us"))?;
//!
//!     let first = backend.search("rust programming").await?;
//!     for result in first.items() {
//!         println!("{}: {}", result.title, result.url);
//!     }
//!
//!     if first.has_more {
//!         let second = backend.next_page(&first, "rust programming").await?;
//!         println!("page {} has {} results", second.page_num, second.len());
//!     }
//!     Ok(())
//! }
//! ```

mod backend;
mod error;
mod result;

pub mod engines;
pub mod extract;
pub mod fetcher;
pub mod fetcher_http;
pub mod region;
pub mod registry;

pub use backend::{Backend, BackendConfig};
pub use error::{Result, SearchError};
pub use fetcher::{FetchRequest, FetchResponse, Method, PageFetcher};
pub use registry::{BackendEntry, Registry};
pub use result::{ContinuationState, Page, SearchResult};

//! Search result and page types.

use serde::{Deserialize, Serialize};

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Result title.
    pub title: String,
    /// Absolute URL of the hit, outside the engine's own domain.
    pub url: String,
    /// Result description, may be empty.
    pub snippet: String,
}

impl SearchResult {
    /// Creates a new search result.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            snippet: snippet.into(),
        }
    }
}

/// Ordered form fields an adapter must replay to fetch the next page.
///
/// Opaque to callers: hand it back untouched inside the [`Page`] it came with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationState {
    fields: Vec<(String, String)>,
}

impl ContinuationState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing an existing entry in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when no fields were captured.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of captured fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates fields in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn into_fields(self) -> Vec<(String, String)> {
        self.fields
    }
}

/// One page of results plus the state needed to move past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Hits in engine order. Never re-sorted.
    pub results: Vec<SearchResult>,
    /// 1-based page number.
    pub page_num: u32,
    /// True only when the engine showed evidence of a following page.
    pub has_more: bool,
    /// Adapter-private replay state; empty for stateless adapters.
    #[serde(default, skip_serializing_if = "ContinuationState::is_empty")]
    pub continuation: ContinuationState,
}

impl Page {
    /// Creates an empty page with the given number, clamped to at least 1.
    pub fn new(page_num: u32) -> Self {
        Self {
            results: Vec::new(),
            page_num: page_num.max(1),
            has_more: false,
            continuation: ContinuationState::new(),
        }
    }

    /// Returns the results.
    pub fn items(&self) -> &[SearchResult] {
        &self.results
    }

    /// Number of results on this page.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Returns true when the engine returned nothing for this page.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

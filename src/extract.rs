//! HTML extraction helpers.
//!
//! Engines reshuffle their markup often. Instead of nesting `if let` fallbacks,
//! an adapter lists the places a value may live and [`SelectorChain`] tries
//! them in order.

use scraper::{ElementRef, Selector};

use crate::{Result, SearchError};

/// Compiles a CSS selector, mapping failures to [`SearchError::Parse`].
pub fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| SearchError::Parse(format!("Failed to parse selector {css:?}: {e:?}")))
}

/// Collects and trims the text content of an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// An ordered list of selectors; the first one yielding non-empty text wins.
#[derive(Debug, Clone)]
pub struct SelectorChain {
    selectors: Vec<Selector>,
}

impl SelectorChain {
    /// Builds a chain from CSS selectors, tried in the given order.
    pub fn new(css: &[&str]) -> Result<Self> {
        let selectors = css
            .iter()
            .map(|s| parse_selector(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { selectors })
    }

    /// Returns the first non-empty trimmed text found under `scope`.
    pub fn first_text(&self, scope: ElementRef<'_>) -> Option<String> {
        self.selectors.iter().find_map(|selector| {
            scope
                .select(selector)
                .next()
                .map(element_text)
                .filter(|text| !text.is_empty())
        })
    }

    /// Number of strategies in the chain.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Returns true when the chain has no strategies.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

//! Search engine implementations.

// Offset-paginated
mod brave;

// Token-paginated
mod duckduckgo;

pub use brave::Brave;
pub use duckduckgo::DuckDuckGo;

//! Name-keyed backend registry.

use crate::engines::{Brave, DuckDuckGo};
use crate::{Backend, BackendConfig, Result, SearchError};

/// Builds a backend from its configuration.
pub type BackendFactory = fn(BackendConfig) -> Result<Box<dyn Backend>>;

/// A registered backend.
#[derive(Clone)]
pub struct BackendEntry {
    /// Canonical lowercase name, matching [`Backend::name`].
    pub name: &'static str,
    /// Alternative names accepted on lookup.
    pub aliases: &'static [&'static str],
    /// Short human description.
    pub description: &'static str,
    factory: BackendFactory,
}

impl BackendEntry {
    /// Creates an entry.
    pub fn new(
        name: &'static str,
        aliases: &'static [&'static str],
        description: &'static str,
        factory: BackendFactory,
    ) -> Self {
        Self {
            name,
            aliases,
            description,
            factory,
        }
    }

    fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }
}

/// Maps engine names to constructors.
///
/// Callers pick a backend by name and get back a `Box<dyn Backend>`, so new
/// engines are added here without touching the contract.
#[derive(Clone, Default)]
pub struct Registry {
    entries: Vec<BackendEntry>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in engine.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BackendEntry::new(
            "duckduckgo",
            &["ddg"],
            "DuckDuckGo HTML (token pagination, cookie session)",
            create_duckduckgo,
        ));
        registry.register(BackendEntry::new(
            "brave",
            &["b"],
            "Brave Search (offset pagination)",
            create_brave,
        ));
        registry
    }

    /// Adds an entry, replacing any entry with the same canonical name
    /// (case-insensitive).
    pub fn register(&mut self, entry: BackendEntry) {
        self.entries
            .retain(|existing| !existing.name.eq_ignore_ascii_case(entry.name));
        self.entries.push(entry);
    }

    /// Finds the entry for a name or alias (case-insensitive).
    pub fn get(&self, name: &str) -> Option<&BackendEntry> {
        let name = name.trim();
        self.entries.iter().find(|entry| entry.matches(name))
    }

    /// Builds the backend registered under `name`.
    pub fn create(&self, name: &str, config: BackendConfig) -> Result<Box<dyn Backend>> {
        let entry = self
            .get(name)
            .ok_or_else(|| SearchError::UnknownBackend(name.to_string()))?;
        (entry.factory)(config)
    }

    /// Iterates entries in registration order.
    pub fn entries(&self) -> impl Iterator<Item = &BackendEntry> {
        self.entries.iter()
    }

    /// Canonical names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.iter().map(|entry| entry.name).collect()
    }
}

fn create_duckduckgo(config: BackendConfig) -> Result<Box<dyn Backend>> {
    Ok(Box::new(DuckDuckGo::new(config)?))
}

fn create_brave(config: BackendConfig) -> Result<Box<dyn Backend>> {
    Ok(Box::new(Brave::new(config)?))
}

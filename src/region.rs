//! Region code tables.
//!
//! Users pass short region codes ("jp", "uk", ...). Each engine spells
//! regions its own way, so every adapter owns a [`RegionTable`] that maps the
//! user code to the engine's parameter value and decides what happens to codes
//! it does not know.

/// What to send for a code missing from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFallback {
    /// Send the code unchanged.
    Passthrough,
    /// Send `"<code>-<code>"`.
    Doubled,
}

/// A fixed user-code to engine-code mapping.
#[derive(Debug, Clone, Copy)]
pub struct RegionTable {
    entries: &'static [(&'static str, &'static str)],
    fallback: RegionFallback,
}

impl RegionTable {
    /// Creates a table over static entries.
    pub const fn new(
        entries: &'static [(&'static str, &'static str)],
        fallback: RegionFallback,
    ) -> Self {
        Self { entries, fallback }
    }

    /// Resolves a user region code.
    ///
    /// Returns `None` for an empty code, meaning no region parameter is sent.
    pub fn resolve(&self, code: &str) -> Option<String> {
        if code.is_empty() {
            return None;
        }
        if let Some((_, mapped)) = self.entries.iter().find(|(user, _)| *user == code) {
            return Some((*mapped).to_string());
        }
        Some(match self.fallback {
            RegionFallback::Passthrough => code.to_string(),
            RegionFallback::Doubled => format!("{code}-{code}"),
        })
    }

    /// User codes this table knows about.
    pub fn codes(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(user, _)| *user)
    }

    /// Returns the fallback policy.
    pub fn fallback(&self) -> RegionFallback {
        self.fallback
    }
}

/// Brave `country` values.
pub const BRAVE_REGIONS: RegionTable = RegionTable::new(
    &[
        ("jp", "jp"),
        ("us", "us"),
        ("uk", "gb"),
        ("de", "de"),
        ("fr", "fr"),
        ("es", "es"),
        ("it", "it"),
        ("br", "br"),
        ("ca", "ca"),
        ("au", "au"),
        ("in", "in"),
        ("kr", "kr"),
        ("cn", "cn"),
        ("tw", "tw"),
        ("ru", "ru"),
    ],
    RegionFallback::Passthrough,
);

/// DuckDuckGo `kl` values.
pub const DUCKDUCKGO_REGIONS: RegionTable = RegionTable::new(
    &[
        ("jp", "jp-jp"),
        ("us", "us-en"),
        ("uk", "uk-en"),
        ("de", "de-de"),
        ("fr", "fr-fr"),
        ("es", "es-es"),
        ("it", "it-it"),
        ("br", "br-pt"),
        ("ca", "ca-en"),
        ("au", "au-en"),
        ("in", "in-en"),
        ("kr", "kr-kr"),
        ("cn", "cn-zh"),
        ("tw", "tw-tzh"),
        ("ru", "ru-ru"),
    ],
    RegionFallback::Doubled,
);

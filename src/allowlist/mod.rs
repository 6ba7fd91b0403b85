//! Curated sender allowlist.
//!
//! The allowlist is the editorial heart of classification: a table of known
//! newsletter names (some with hand-picked icon assets) and a table of
//! domains that only ever send newsletters. The builtin table ships embedded
//! in the crate and is parsed once per process; embedders can also load
//! their own table from JSON with the same shape:
//!
//! ```json
//! {
//!   "domains": ["substack.com"],
//!   "names": {
//!     "avc": true,
//!     "benedict evans": { "icon": "/assets/icons/benedictevans.jpeg" }
//!   }
//! }
//! ```

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;
use thiserror::Error;

const BUILTIN_DATA: &str = include_str!("senders.json");

static BUILTIN: LazyLock<Allowlist> = LazyLock::new(|| {
    Allowlist::from_json(BUILTIN_DATA).expect("embedded allowlist data is valid JSON")
});

/// Errors raised while loading an allowlist table.
#[derive(Debug, Error)]
pub enum AllowlistError {
    /// The table was not valid JSON of the expected shape.
    #[error("invalid allowlist data: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A name table entry: either a bare membership flag or a flag with a
/// hand-picked icon asset.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NameEntry {
    Flag(bool),
    Icon { icon: String },
}

#[derive(Debug, Deserialize)]
struct AllowlistData {
    domains: Vec<String>,
    names: HashMap<String, NameEntry>,
}

/// The curated sender table, immutable once loaded.
///
/// All lookups case-fold their argument; the underlying keys are stored
/// lowercase.
#[derive(Debug, Clone)]
pub struct Allowlist {
    /// Lowercased publication name to optional icon asset path.
    names: HashMap<String, Option<String>>,
    /// Lowercased sending domains, matched whole.
    domains: HashSet<String>,
}

impl Allowlist {
    /// Returns the builtin table, parsed once per process.
    pub fn builtin() -> &'static Allowlist {
        &BUILTIN
    }

    /// Loads a table from JSON.
    pub fn from_json(data: &str) -> Result<Self, AllowlistError> {
        let data: AllowlistData = serde_json::from_str(data)?;

        let names = data
            .names
            .into_iter()
            .filter_map(|(name, entry)| match entry {
                NameEntry::Flag(true) => Some((name.to_lowercase(), None)),
                NameEntry::Flag(false) => None,
                NameEntry::Icon { icon } => Some((name.to_lowercase(), Some(icon))),
            })
            .collect();

        let domains = data.domains.into_iter().map(|d| d.to_lowercase()).collect();

        Ok(Self { names, domains })
    }

    /// Returns true when the publication name is allowlisted.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_lowercase())
    }

    /// Returns the hand-picked icon asset for a name, if one exists.
    pub fn icon_override(&self, name: &str) -> Option<&str> {
        self.names
            .get(&name.to_lowercase())
            .and_then(|icon| icon.as_deref())
    }

    /// Returns true when the full sending domain is allowlisted.
    ///
    /// Domains are matched whole: `e.newyorktimes.com` is listed with its
    /// prefix and only matches exactly.
    pub fn contains_domain(&self, domain: &str) -> bool {
        self.domains.contains(&domain.to_lowercase())
    }

    /// Number of name entries.
    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    /// Number of domain entries.
    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }
}

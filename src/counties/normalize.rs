//! Lookup keys for free-text county names.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How jurisdiction suffixes are handled when building a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuffixPolicy {
    /// Drop both "county" and "city" tokens.
    ///
    /// Matches how the source feeds have always been reconciled, but merges
    /// "Baltimore County" with "Baltimore City", which are distinct
    /// jurisdictions.
    #[default]
    StripBoth,
    /// Drop only "county"; "city" stays part of the key.
    KeepCity,
}

/// The trailing jurisdiction word of a raw name, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixKind {
    County,
    City,
}

impl SuffixKind {
    pub fn of(raw: &str) -> Option<Self> {
        let last = raw
            .split(|c: char| c.is_whitespace() || c == '_')
            .rfind(|t| !t.is_empty())?;
        if last.eq_ignore_ascii_case("county") {
            Some(SuffixKind::County)
        } else if last.eq_ignore_ascii_case("city") {
            Some(SuffixKind::City)
        } else {
            None
        }
    }
}

/// Derived lookup key: lower-cased, suffix tokens removed, whitespace
/// collapsed. Many raw spellings share one key. Never stored as identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizationKey(String);

impl NormalizationKey {
    /// Build the key for `raw`. Returns `None` when nothing is left.
    pub fn new(raw: &str, policy: SuffixPolicy) -> Option<Self> {
        let lowered = raw.trim().to_lowercase().replace('_', " ");
        let key = lowered
            .split_whitespace()
            .filter(|token| match *token {
                "county" => false,
                "city" => policy == SuffixPolicy::KeepCity,
                _ => true,
            })
            .collect::<Vec<_>>()
            .join(" ");

        if key.is_empty() {
            None
        } else {
            Some(NormalizationKey(key))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display form of a raw name: trimmed, underscores as spaces, single spaces.
pub fn display_name(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

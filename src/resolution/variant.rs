//! Logical intents and their physical query variants.

use serde::Serialize;
use std::fmt;

/// The logical report being asked for, independent of schema generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    Overview,
    EnforcementSummary,
    WageSummary,
    CountyList,
}

impl QueryIntent {
    pub const ALL: [QueryIntent; 4] = [
        QueryIntent::Overview,
        QueryIntent::EnforcementSummary,
        QueryIntent::WageSummary,
        QueryIntent::CountyList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryIntent::Overview => "overview",
            QueryIntent::EnforcementSummary => "enforcement_summary",
            QueryIntent::WageSummary => "wage_summary",
            QueryIntent::CountyList => "county_list",
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One physical formulation of an intent against one assumed schema.
///
/// Variants are static data. Lower ordinals are tried first, so the
/// fastest or most precomputed formulation gets the lowest ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryVariant {
    pub intent: QueryIntent,
    pub ordinal: u32,
    /// Short label for logs and errors, e.g. `aggregate_view`.
    pub name: &'static str,
    /// SQL text with `:name` placeholders.
    pub template: &'static str,
    /// Every placeholder the template uses, without the leading `:`.
    pub params: &'static [&'static str],
}

impl QueryVariant {
    pub fn accepts(&self, param: &str) -> bool {
        self.params.contains(&param.trim_start_matches(':'))
    }
}

impl fmt::Display for QueryVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{} ({})", self.intent, self.ordinal, self.name)
    }
}

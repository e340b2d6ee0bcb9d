//! Caller-facing report filters and their conversion to bound parameters.
//!
//! Absent filters are bound as NULL, so every template is static text with
//! `(:x IS NULL OR ...)` guards instead of conditionally assembled clauses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{ReportError, ReportResult};
use crate::warehouse::{QueryParams, Value};

pub const MIN_LIMIT: u32 = 1;
pub const MAX_LIMIT: u32 = 10_000;
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Clamp a requested row cap into `[MIN_LIMIT, MAX_LIMIT]`.
pub fn clamp_limit(requested: Option<u32>, default: u32) -> u32 {
    requested.unwrap_or(default).clamp(MIN_LIMIT, MAX_LIMIT)
}

/// Case-insensitive partial match pattern. Blank text means no filter.
pub fn county_pattern(text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    if text.is_empty() {
        None
    } else {
        Some(format!("%{text}%"))
    }
}

pub fn check_year(year: Option<i32>) -> ReportResult<Option<i32>> {
    match year {
        Some(y) if !(MIN_YEAR..=MAX_YEAR).contains(&y) => Err(ReportError::InvalidParameter {
            name: "year",
            message: format!("{y} is outside {MIN_YEAR}..={MAX_YEAR}"),
        }),
        other => Ok(other),
    }
}

/// Enforcement feed label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementSource {
    Air,
    Water,
}

impl EnforcementSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnforcementSource::Air => "air",
            EnforcementSource::Water => "water",
        }
    }
}

impl fmt::Display for EnforcementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnforcementSource {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "air" => Ok(EnforcementSource::Air),
            "water" => Ok(EnforcementSource::Water),
            other => Err(ReportError::InvalidParameter {
                name: "source",
                message: format!("expected 'air' or 'water', got '{other}'"),
            }),
        }
    }
}

/// Filters shared by the overview and wage reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportFilter {
    pub county: Option<String>,
    pub year: Option<i32>,
    pub limit: Option<u32>,
}

impl ReportFilter {
    pub fn county(mut self, county: impl Into<String>) -> Self {
        self.county = Some(county.into());
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub(crate) fn to_params(&self, default_limit: u32) -> ReportResult<QueryParams> {
        let year = check_year(self.year)?;
        Ok(QueryParams::new()
            .with("county", county_pattern(self.county.as_deref()))
            .with("year", year)
            .with("limit", clamp_limit(self.limit, default_limit)))
    }
}

/// Filters for the enforcement summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnforcementFilter {
    pub county: Option<String>,
    pub year: Option<i32>,
    pub source: Option<EnforcementSource>,
    pub limit: Option<u32>,
}

impl EnforcementFilter {
    pub fn source(mut self, source: EnforcementSource) -> Self {
        self.source = Some(source);
        self
    }

    pub(crate) fn to_params(&self, default_limit: u32) -> ReportResult<QueryParams> {
        let base = ReportFilter {
            county: self.county.clone(),
            year: self.year,
            limit: self.limit,
        };
        let source = self.source.map(|s| Value::from(s.as_str()));
        Ok(base.to_params(default_limit)?.with("source", source))
    }
}

impl From<ReportFilter> for EnforcementFilter {
    fn from(f: ReportFilter) -> Self {
        Self {
            county: f.county,
            year: f.year,
            source: None,
            limit: f.limit,
        }
    }
}

/// Filters for the county listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CountyFilter {
    pub name: Option<String>,
    /// Exact state code, e.g. `MD`.
    pub state: Option<String>,
    pub limit: Option<u32>,
}

impl CountyFilter {
    pub(crate) fn to_params(&self, default_limit: u32) -> QueryParams {
        let state = self
            .state
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        QueryParams::new()
            .with("name", county_pattern(self.name.as_deref()))
            .with("state", state)
            .with("limit", clamp_limit(self.limit, default_limit))
    }
}

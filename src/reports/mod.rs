//! Report builders.
//!
//! Each report owns an ordered list of [`QueryVariant`]s, one per schema
//! generation it can read, and a typed row. [`ReportService`] binds the
//! caller's filters and runs them through the [`QueryEngine`].
//!
//! | Report               | Default limit | Variants (tried in order)                                  |
//! |----------------------|---------------|------------------------------------------------------------|
//! | overview             | 1000          | aggregate view, per-source, per-source undated, normalized |
//! | enforcement summary  | 500           | per-source, per-source undated, normalized                 |
//! | wages                | 1000          | per-source, normalized (two wage column names)             |
//! | counties             | 1000          | per-source, normalized, normalized without state           |

mod counties;
mod enforcements;
mod filters;
mod overview;
mod wages;

use serde::Serialize;

use crate::config::ApiSettings;
use crate::resolution::{QueryEngine, QueryIntent, ResolutionError, VariantRegistry};
use crate::warehouse::Warehouse;

pub use counties::CountyRow;
pub use enforcements::EnforcementSummary;
pub use filters::{
    check_year, clamp_limit, county_pattern, CountyFilter, EnforcementFilter, EnforcementSource,
    ReportFilter, MAX_LIMIT, MAX_YEAR, MIN_LIMIT, MIN_YEAR,
};
pub use overview::{OverviewResponse, ReportRow};
pub use wages::WageSummary;

/// Default row caps per report.
pub mod defaults {
    pub use super::counties::DEFAULT_LIMIT as COUNTIES;
    pub use super::enforcements::DEFAULT_LIMIT as ENFORCEMENTS;
    pub use super::overview::DEFAULT_LIMIT as OVERVIEW;
    pub use super::wages::DEFAULT_LIMIT as WAGES;
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Invalid parameter '{name}': {message}")]
    InvalidParameter { name: &'static str, message: String },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// Registry holding every report variant shipped with the crate.
pub fn builtin_registry() -> VariantRegistry {
    VariantRegistry::new()
        .with(&overview::VARIANTS)
        .with(&enforcements::VARIANTS)
        .with(&wages::VARIANTS)
        .with(&counties::VARIANTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub db_connected: bool,
    pub version: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

/// Read-only report operations over a warehouse.
#[derive(Debug, Clone)]
pub struct ReportService<W> {
    engine: QueryEngine<W>,
    api: ApiSettings,
}

impl<W: Warehouse> ReportService<W> {
    pub fn new(warehouse: W, api: ApiSettings) -> Self {
        Self::with_registry(warehouse, builtin_registry(), api)
    }

    pub fn with_registry(warehouse: W, registry: VariantRegistry, api: ApiSettings) -> Self {
        Self {
            engine: QueryEngine::new(warehouse, registry),
            api,
        }
    }

    pub fn engine(&self) -> &QueryEngine<W> {
        &self.engine
    }

    pub fn get_overview(&self, filter: &ReportFilter) -> ReportResult<OverviewResponse> {
        let params = filter.to_params(defaults::OVERVIEW)?;
        let items: Vec<ReportRow> = self.engine.execute(QueryIntent::Overview, &params)?;
        Ok(items.into())
    }

    pub fn get_enforcement_summary(
        &self,
        filter: &EnforcementFilter,
    ) -> ReportResult<Vec<EnforcementSummary>> {
        let params = filter.to_params(defaults::ENFORCEMENTS)?;
        Ok(self
            .engine
            .execute(QueryIntent::EnforcementSummary, &params)?)
    }

    pub fn list_wages(&self, filter: &ReportFilter) -> ReportResult<Vec<WageSummary>> {
        let params = filter.to_params(defaults::WAGES)?;
        Ok(self.engine.execute(QueryIntent::WageSummary, &params)?)
    }

    pub fn list_counties(&self, filter: &CountyFilter) -> ReportResult<Vec<CountyRow>> {
        let params = filter.to_params(defaults::COUNTIES);
        Ok(self.engine.execute(QueryIntent::CountyList, &params)?)
    }

    /// Probe the warehouse. Connectivity failures degrade the status and
    /// are never returned as errors.
    pub fn health_check(&self) -> HealthResponse {
        let db_connected = match self.engine.warehouse().ping() {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "warehouse health probe failed");
                false
            }
        };
        HealthResponse {
            status: if db_connected {
                HealthStatus::Ok
            } else {
                HealthStatus::Degraded
            },
            db_connected,
            version: self.api.version.clone(),
        }
    }
}

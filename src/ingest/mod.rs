//! Ingestion normalizer.
//!
//! Turns raw open-data documents into per-source warehouse rows:
//!
//! ```text
//! raw_data/*.json ──▶ RawDocument ──▶ phase 1: CountyDirectory::observe
//!                                  └─▶ phase 2: normalize ──▶ INSERT OR IGNORE
//! ```
//!
//! Per-record transforms are pure. A record whose county does not resolve
//! is dropped and counted; a field that does not parse becomes NULL (or `0`
//! for zip codes). Uniqueness constraints in the warehouse make re-runs
//! insert nothing new.

pub mod air;
pub mod cleanse;
mod pipeline;
pub mod wages;
pub mod water;

use std::path::PathBuf;

use crate::warehouse::WarehouseError;

pub use air::AirEnforcementRow;
pub use cleanse::{
    combine_columns, parse_date, parse_wage, split_city_state_zip, truncate_zip, CityStateZip,
    RawRecord,
};
pub use pipeline::{IngestPipeline, IngestReport, RawDocument, SourceKind, SourceReport};
pub use wages::{MeltedWages, StatewideWageRow, WageRow};
pub use water::WaterEnforcementRow;

/// Separator between `ai_id` and `ai_name` in the combined identifier.
pub const IDENTIFIER_SEPARATOR: &str = " ";

/// Outcome of normalizing one raw record.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Row(T),
    /// The county did not resolve; carries the raw name if there was one.
    Dropped { county: Option<String> },
}

impl<T> Normalized<T> {
    pub fn row(self) -> Option<T> {
        match self {
            Normalized::Row(row) => Some(row),
            Normalized::Dropped { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Failed to read {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },

    #[error("Invalid JSON in {source_kind} document: {error}")]
    Json {
        source_kind: SourceKind,
        #[source]
        error: serde_json::Error,
    },

    #[error("{0} document is not a JSON array")]
    NotAnArray(SourceKind),

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

//! # mdwarehouse
//!
//! Maryland environmental-enforcement and wage warehouse.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │            Raw open-data documents (JSON)                │
//! │   air enforcement · water enforcement · wide wage table  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [ingest] ◀── [counties] canonical directory
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Warehouse (SQLite)                       │
//! │   aggregate view · per-source tables · normalized tables │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [resolution] first variant that executes
//! ┌─────────────────────────────────────────────────────────┐
//! │                [reports] ReportService                   │
//! │   overview · enforcement summary · wages · counties      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The warehouse schema has changed shape several times and environments
//! can sit at different generations. Reports never branch on a schema
//! version; each one lists query variants in priority order and the first
//! one that runs answers.

pub mod config;
pub mod counties;
pub mod ingest;
pub mod reports;
pub mod resolution;
pub mod warehouse;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::config::{Settings, WarehouseTarget};
    pub use crate::counties::{CountyDirectory, CountyRecord, SuffixPolicy};
    pub use crate::ingest::{IngestPipeline, IngestReport, RawDocument, SourceKind};
    pub use crate::reports::{
        CountyFilter, EnforcementFilter, EnforcementSource, ReportFilter, ReportService,
    };
    pub use crate::resolution::{QueryEngine, QueryIntent, QueryVariant, VariantRegistry};
    pub use crate::warehouse::{AccessMode, SqliteWarehouse, Warehouse};
}

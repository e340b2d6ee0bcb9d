//! Batch load of raw documents into the per-source tables.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use serde::Serialize;
use serde_json::Value as Json;
use uuid::Uuid;

use super::cleanse::{sha256_hex, RawRecord};
use super::{air, wages, water, IngestError, IngestResult, Normalized};
use crate::config::IngestSettings;
use crate::counties::CountyDirectory;
use crate::warehouse::{schema, SqliteWarehouse};

/// Which feed a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    AirEnforcement,
    WaterEnforcement,
    AverageWage,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::AirEnforcement,
        SourceKind::WaterEnforcement,
        SourceKind::AverageWage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::AirEnforcement => "air_enforcement",
            SourceKind::WaterEnforcement => "water_enforcement",
            SourceKind::AverageWage => "average_wage",
        }
    }

    /// File name used under the raw data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            SourceKind::AirEnforcement => "md_air_enforcement.json",
            SourceKind::WaterEnforcement => "md_water_enforcement.json",
            SourceKind::AverageWage => "md_average_wage.json",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed raw document: a JSON array of objects.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source: SourceKind,
    pub sha256: String,
    pub records: Vec<RawRecord>,
}

impl RawDocument {
    pub fn from_json(source: SourceKind, text: &str) -> IngestResult<Self> {
        let parsed: Json = serde_json::from_str(text).map_err(|e| IngestError::Json {
            source_kind: source,
            error: e,
        })?;
        let Json::Array(items) = parsed else {
            return Err(IngestError::NotAnArray(source));
        };

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            match item {
                Json::Object(map) => records.push(map),
                other => tracing::debug!(source = %source, value = %other, "skipping non-object entry"),
            }
        }

        Ok(Self {
            source,
            sha256: sha256_hex(text.as_bytes()),
            records,
        })
    }

    pub fn from_path(source: SourceKind, path: &Path) -> IngestResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| IngestError::Io {
            path: path.to_path_buf(),
            error: e,
        })?;
        Self::from_json(source, &text)
    }

    /// Read every known feed present in `dir`. Missing files are skipped.
    pub fn from_dir(dir: &Path) -> IngestResult<Vec<Self>> {
        let mut docs = Vec::new();
        for source in SourceKind::ALL {
            let path: PathBuf = dir.join(source.file_name());
            if path.is_file() {
                docs.push(Self::from_path(source, &path)?);
            } else {
                tracing::info!(path = %path.display(), "raw document not found, skipping");
            }
        }
        Ok(docs)
    }
}

/// Counts for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: Option<SourceKind>,
    pub document_sha256: String,
    pub records: usize,
    pub inserted: usize,
    pub duplicates: usize,
    /// Records (or wage cells) dropped because the county did not resolve.
    pub dropped: usize,
    pub unresolved_counties: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub run_id: String,
    pub counties_registered: usize,
    pub sources: Vec<SourceReport>,
}

impl IngestReport {
    pub fn inserted(&self) -> usize {
        self.sources.iter().map(|s| s.inserted).sum()
    }

    pub fn duplicates(&self) -> usize {
        self.sources.iter().map(|s| s.duplicates).sum()
    }

    pub fn dropped(&self) -> usize {
        self.sources.iter().map(|s| s.dropped).sum()
    }
}

/// Loads raw documents into a writable warehouse.
///
/// Phase 1 registers every county name the documents mention and persists
/// the directory; phase 2 normalizes and inserts rows. Re-running over the
/// same documents inserts nothing new.
pub struct IngestPipeline<'w> {
    warehouse: &'w SqliteWarehouse,
    directory: CountyDirectory,
}

impl<'w> IngestPipeline<'w> {
    /// Apply the schema, then seed the directory from the warehouse and
    /// the configured known counties.
    pub fn new(warehouse: &'w SqliteWarehouse, settings: &IngestSettings) -> IngestResult<Self> {
        schema::apply(&*warehouse.connection()?)?;
        let directory = CountyDirectory::from_settings(settings, warehouse)?;

        Ok(Self {
            warehouse,
            directory,
        })
    }

    pub fn directory(&self) -> &CountyDirectory {
        &self.directory
    }

    pub fn run(&mut self, docs: &[RawDocument]) -> IngestResult<IngestReport> {
        let run_id = Uuid::new_v4().to_string();
        let before = self.directory.len();

        for doc in docs {
            self.register_counties(doc);
        }

        let mut conn = self.warehouse.connection()?;
        let counties_registered = self.directory.persist(&conn)?;
        tracing::info!(
            run_id = %run_id,
            new = self.directory.len() - before,
            persisted = counties_registered,
            "county directory updated"
        );

        let mut sources = Vec::with_capacity(docs.len());
        for doc in docs {
            let tx = conn.transaction()?;
            let report = self.load_document(&tx, doc)?;
            record_run(&tx, &run_id, &report)?;
            tx.commit()?;

            for name in &report.unresolved_counties {
                let suggestion = self
                    .directory
                    .suggest(name)
                    .map(|r| r.canonical_name.as_str());
                tracing::warn!(
                    source = %doc.source,
                    county = %name,
                    suggestion = ?suggestion,
                    "dropped records with unresolved county"
                );
            }
            tracing::info!(
                source = %doc.source,
                records = report.records,
                inserted = report.inserted,
                duplicates = report.duplicates,
                dropped = report.dropped,
                "loaded document"
            );
            sources.push(report);
        }

        Ok(IngestReport {
            run_id,
            counties_registered,
            sources,
        })
    }

    fn register_counties(&mut self, doc: &RawDocument) {
        for record in &doc.records {
            match doc.source {
                SourceKind::AirEnforcement => {
                    if let Some(name) = air::county_name(record) {
                        self.directory.observe(&name);
                    }
                }
                SourceKind::WaterEnforcement => {
                    if let Some(name) = water::county_name(record) {
                        self.directory.observe(&name);
                    }
                }
                SourceKind::AverageWage => {
                    for column in wages::county_columns(record) {
                        self.directory.observe(column);
                    }
                }
            }
        }
    }

    fn load_document(&self, conn: &Connection, doc: &RawDocument) -> IngestResult<SourceReport> {
        let mut report = SourceReport {
            source: Some(doc.source),
            document_sha256: doc.sha256.clone(),
            records: doc.records.len(),
            ..SourceReport::default()
        };
        let mut unresolved = BTreeSet::new();

        for record in &doc.records {
            match doc.source {
                SourceKind::AirEnforcement => match air::normalize(record, &self.directory) {
                    Normalized::Row(row) => report.tally(air::insert(conn, &row)?),
                    Normalized::Dropped { county } => report.mark_dropped(county, &mut unresolved),
                },
                SourceKind::WaterEnforcement => match water::normalize(record, &self.directory) {
                    Normalized::Row(row) => report.tally(water::insert(conn, &row)?),
                    Normalized::Dropped { county } => report.mark_dropped(county, &mut unresolved),
                },
                SourceKind::AverageWage => {
                    let Some(melted) = wages::normalize(record, &self.directory) else {
                        tracing::debug!("skipping wage record without a year");
                        report.dropped += 1;
                        continue;
                    };
                    for row in &melted.rows {
                        report.tally(wages::insert(conn, row)?);
                    }
                    if let Some(statewide) = &melted.statewide {
                        wages::insert_statewide(conn, statewide)?;
                    }
                    for column in melted.unresolved {
                        report.mark_dropped(Some(column), &mut unresolved);
                    }
                }
            }
        }

        report.unresolved_counties = unresolved.into_iter().collect();
        Ok(report)
    }
}

impl SourceReport {
    fn tally(&mut self, inserted: bool) {
        if inserted {
            self.inserted += 1;
        } else {
            self.duplicates += 1;
        }
    }

    fn mark_dropped(&mut self, county: Option<String>, unresolved: &mut BTreeSet<String>) {
        self.dropped += 1;
        unresolved.insert(county.unwrap_or_else(|| "<missing>".to_string()));
    }
}

fn record_run(conn: &Connection, run_id: &str, report: &SourceReport) -> rusqlite::Result<()> {
    let source = report.source.map(|s| s.as_str()).unwrap_or("unknown");
    conn.execute(
        "INSERT INTO ingest_runs (run_id, source, document_sha256, inserted, duplicates, dropped)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            run_id,
            source,
            report.document_sha256,
            report.inserted as i64,
            report.duplicates as i64,
            report.dropped as i64,
        ],
    )?;
    Ok(())
}

//! DDL for the tables ingestion writes.
//!
//! This is the per-source generation of the warehouse: one table per
//! enforcement feed, a long-form wage table keyed by county and year, and
//! the county directory. Older and newer generations exist in other
//! environments; reports cope with all of them through query variants, so
//! nothing here migrates an existing schema in place.

use rusqlite::{params, Connection, OptionalExtension};

use super::WarehouseResult;

/// Version recorded in the `meta` table. Bump when the DDL below changes.
pub const SCHEMA_VERSION: i32 = 1;

const DDL: &str = "
CREATE TABLE IF NOT EXISTS meta (
    key   TEXT PRIMARY KEY,
    value TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS counties (
    county_id   INTEGER PRIMARY KEY,
    county_name TEXT NOT NULL UNIQUE,
    state       TEXT
);

CREATE TABLE IF NOT EXISTS air_enforcements (
    ai_combined        TEXT PRIMARY KEY,
    county_id          INTEGER NOT NULL REFERENCES counties(county_id),
    achieved_date      TEXT,
    year               INTEGER,
    action_description TEXT,
    address            TEXT,
    city               TEXT,
    state              TEXT,
    zip_code           INTEGER,
    documents          TEXT
);

CREATE TABLE IF NOT EXISTS water_enforcements (
    ai_combined               TEXT PRIMARY KEY,
    county_id                 INTEGER NOT NULL REFERENCES counties(county_id),
    upload_id                 TEXT,
    address                   TEXT,
    city                      TEXT,
    state                     TEXT,
    zip_code                  INTEGER,
    program                   TEXT,
    enforcement_action        TEXT,
    enforcement_number        TEXT,
    enforcement_action_issued TEXT,
    case_closed               TEXT,
    year                      INTEGER,
    media                     TEXT
);

CREATE TABLE IF NOT EXISTS wage_per_county (
    county_id       INTEGER NOT NULL REFERENCES counties(county_id),
    year            INTEGER NOT NULL,
    wage_for_county REAL,
    PRIMARY KEY (county_id, year)
);

CREATE TABLE IF NOT EXISTS average_wage_maryland (
    year           INTEGER PRIMARY KEY,
    wage_that_year REAL,
    date_created   TEXT
);

CREATE TABLE IF NOT EXISTS ingest_runs (
    run_id          TEXT NOT NULL,
    source          TEXT NOT NULL,
    document_sha256 TEXT NOT NULL,
    inserted        INTEGER NOT NULL,
    duplicates      INTEGER NOT NULL,
    dropped         INTEGER NOT NULL,
    loaded_at       TEXT NOT NULL DEFAULT (datetime('now')),
    PRIMARY KEY (run_id, source)
);

CREATE INDEX IF NOT EXISTS idx_air_county_year ON air_enforcements (county_id, year);
CREATE INDEX IF NOT EXISTS idx_water_county_year ON water_enforcements (county_id, year);
";

/// Create the ingestion tables if they do not exist and record the version.
pub fn apply(conn: &Connection) -> WarehouseResult<()> {
    let stored = version(conn)?;
    conn.execute_batch(DDL)?;

    match stored {
        Some(v) if v == SCHEMA_VERSION => {}
        Some(v) => {
            tracing::warn!(
                stored = v,
                current = SCHEMA_VERSION,
                "warehouse schema version differs; tables are left as they are"
            );
        }
        None => {
            conn.execute(
                "INSERT OR IGNORE INTO meta (key, value) VALUES ('schema_version', ?)",
                params![SCHEMA_VERSION.to_string()],
            )?;
            tracing::debug!(version = SCHEMA_VERSION, "recorded warehouse schema version");
        }
    }

    Ok(())
}

/// Read the recorded schema version, if any.
pub fn version(conn: &Connection) -> WarehouseResult<Option<i32>> {
    let has_meta: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'meta')",
        [],
        |row| row.get(0),
    )?;
    if !has_meta {
        return Ok(None);
    }
    let stored: Option<String> = conn
        .query_row(
            "SELECT value FROM meta WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    Ok(stored.and_then(|s| s.parse().ok()))
}

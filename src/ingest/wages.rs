//! The wide average-wage table: one object per year, one column per county.

use rusqlite::{params, Connection};
use serde::Serialize;

use super::cleanse::{field_text, parse_year, wage_value, RawRecord};
use crate::counties::CountyDirectory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WageRow {
    pub county_id: i64,
    pub year: i32,
    pub wage_for_county: Option<f64>,
}

/// Statewide figure from the `MARYLAND` column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatewideWageRow {
    pub year: i32,
    pub wage_that_year: Option<f64>,
    pub date_created: Option<String>,
}

/// Result of melting one wide record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeltedWages {
    pub rows: Vec<WageRow>,
    pub statewide: Option<StatewideWageRow>,
    /// County columns whose name did not resolve.
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Year,
    Statewide,
    DateCreated,
    Metadata,
    County,
}

fn classify(key: &str) -> Column {
    let folded = key.trim().to_lowercase().replace(' ', "_");
    match folded.as_str() {
        "year" => Column::Year,
        "maryland" => Column::Statewide,
        "date_created" => Column::DateCreated,
        _ if folded.starts_with(':') => Column::Metadata,
        _ => Column::County,
    }
}

/// County column names in a record, for directory registration.
pub fn county_columns(record: &RawRecord) -> impl Iterator<Item = &str> {
    record
        .keys()
        .map(String::as_str)
        .filter(|k| classify(k) == Column::County)
}

/// Melt one wide record into per-county rows.
///
/// Returns `None` when the record has no usable year.
pub fn normalize(record: &RawRecord, directory: &CountyDirectory) -> Option<MeltedWages> {
    let year = record
        .iter()
        .find(|(k, _)| classify(k) == Column::Year)
        .and_then(|(_, v)| parse_year(v))?;

    let mut melted = MeltedWages::default();
    let mut date_created = None;
    let mut statewide = None;

    for (key, value) in record {
        match classify(key) {
            Column::Year | Column::Metadata => {}
            Column::DateCreated => date_created = field_text(record, key),
            Column::Statewide => statewide = Some(wage_value(value)),
            Column::County => match directory.resolve(key) {
                Some(county) => melted.rows.push(WageRow {
                    county_id: county.canonical_id,
                    year,
                    wage_for_county: wage_value(value),
                }),
                None => melted.unresolved.push(key.clone()),
            },
        }
    }

    melted.statewide = statewide.map(|wage_that_year| StatewideWageRow {
        year,
        wage_that_year,
        date_created,
    });
    Some(melted)
}

pub fn insert(conn: &Connection, row: &WageRow) -> rusqlite::Result<bool> {
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO wage_per_county (county_id, year, wage_for_county)
             VALUES (?1, ?2, ?3)",
        )?
        .execute(params![row.county_id, row.year, row.wage_for_county])?;
    Ok(changed > 0)
}

pub fn insert_statewide(conn: &Connection, row: &StatewideWageRow) -> rusqlite::Result<bool> {
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO average_wage_maryland (year, wage_that_year, date_created)
             VALUES (?1, ?2, ?3)",
        )?
        .execute(params![row.year, row.wage_that_year, row.date_created])?;
    Ok(changed > 0)
}

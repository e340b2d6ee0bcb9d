//! Air enforcement records.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

use super::cleanse::{
    combine_columns, compute_hash, field_text, first_field, parse_date, split_city_state_zip,
    truncate_zip, RawRecord,
};
use super::{Normalized, IDENTIFIER_SEPARATOR};
use crate::counties::CountyDirectory;

const COUNTY_FIELD: &str = "county";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AirEnforcementRow {
    pub ai_combined: String,
    pub county_id: i64,
    pub achieved_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub action_description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: i64,
    pub documents: Option<String>,
}

pub fn county_name(record: &RawRecord) -> Option<String> {
    field_text(record, COUNTY_FIELD)
}

/// Normalize one raw air record. Unresolved counties yield `Dropped`.
pub fn normalize(record: &RawRecord, directory: &CountyDirectory) -> Normalized<AirEnforcementRow> {
    let raw_county = county_name(record);
    let Some(county) = raw_county.as_deref().and_then(|c| directory.resolve(c)) else {
        return Normalized::Dropped { county: raw_county };
    };

    let location = field_text(record, "city_state_zip")
        .map(|s| split_city_state_zip(&s))
        .unwrap_or_default();
    let zip = location.zip.clone().or_else(|| field_text(record, "zip"));
    let achieved_date = field_text(record, "achieved_date").and_then(|s| parse_date(&s));

    Normalized::Row(AirEnforcementRow {
        ai_combined: identifier(record),
        county_id: county.canonical_id,
        achieved_date,
        year: achieved_date.map(|d| d.year()),
        action_description: field_text(record, "action_description"),
        address: first_field(record, &["addressinfo", "address"]),
        city: location.city.or_else(|| field_text(record, "city")),
        state: location.state.or_else(|| field_text(record, "state")),
        zip_code: zip.as_deref().map(truncate_zip).unwrap_or(0),
        documents: field_text(record, "documents"),
    })
}

/// `ai_id` and `ai_name` joined, or a fingerprint of the whole record.
pub(crate) fn identifier(record: &RawRecord) -> String {
    let combined = combine_columns(
        field_text(record, "ai_id").as_deref(),
        field_text(record, "ai_name").as_deref(),
        IDENTIFIER_SEPARATOR,
    );
    combined.unwrap_or_else(|| {
        let digest = compute_hash(record).unwrap_or_default();
        format!("sha256:{digest}")
    })
}

/// Returns `true` when a new row was written.
pub fn insert(conn: &Connection, row: &AirEnforcementRow) -> rusqlite::Result<bool> {
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO air_enforcements
             (ai_combined, county_id, achieved_date, year, action_description,
              address, city, state, zip_code, documents)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?
        .execute(params![
            row.ai_combined,
            row.county_id,
            row.achieved_date.map(|d| d.to_string()),
            row.year,
            row.action_description,
            row.address,
            row.city,
            row.state,
            row.zip_code,
            row.documents,
        ])?;
    Ok(changed > 0)
}

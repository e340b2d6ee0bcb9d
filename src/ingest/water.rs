//! Water enforcement records.

use chrono::{Datelike, NaiveDate};
use rusqlite::{params, Connection};
use serde::Serialize;

use super::air::identifier;
use super::cleanse::{field_text, first_field, parse_date, split_city_state_zip, truncate_zip, RawRecord};
use super::Normalized;
use crate::counties::CountyDirectory;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaterEnforcementRow {
    pub ai_combined: String,
    pub county_id: i64,
    pub upload_id: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: i64,
    pub program: Option<String>,
    pub enforcement_action: Option<String>,
    pub enforcement_number: Option<String>,
    pub enforcement_action_issued: Option<NaiveDate>,
    pub case_closed: Option<NaiveDate>,
    /// Year of the issued date, else of the closure date.
    pub year: Option<i32>,
    pub media: Option<String>,
}

pub fn county_name(record: &RawRecord) -> Option<String> {
    field_text(record, "county")
}

pub fn normalize(
    record: &RawRecord,
    directory: &CountyDirectory,
) -> Normalized<WaterEnforcementRow> {
    let raw_county = county_name(record);
    let Some(county) = raw_county.as_deref().and_then(|c| directory.resolve(c)) else {
        return Normalized::Dropped { county: raw_county };
    };

    let location = field_text(record, "city_state_zip")
        .map(|s| split_city_state_zip(&s))
        .unwrap_or_default();
    let zip = location.zip.clone().or_else(|| field_text(record, "zip"));
    let issued = field_text(record, "enforcement_action_issued").and_then(|s| parse_date(&s));
    let closed = field_text(record, "case_closed").and_then(|s| parse_date(&s));

    Normalized::Row(WaterEnforcementRow {
        ai_combined: identifier(record),
        county_id: county.canonical_id,
        upload_id: field_text(record, "upload_id"),
        address: first_field(record, &["address", "addressinfo"]),
        city: location.city.or_else(|| field_text(record, "city")),
        state: location.state.or_else(|| field_text(record, "state")),
        zip_code: zip.as_deref().map(truncate_zip).unwrap_or(0),
        program: field_text(record, "program"),
        enforcement_action: field_text(record, "enforcement_action"),
        enforcement_number: first_field(record, &["enforcement_action_no", "enforcement_number"]),
        enforcement_action_issued: issued,
        case_closed: closed,
        year: issued.or(closed).map(|d| d.year()),
        media: field_text(record, "media"),
    })
}

/// Returns `true` when a new row was written.
pub fn insert(conn: &Connection, row: &WaterEnforcementRow) -> rusqlite::Result<bool> {
    let changed = conn
        .prepare_cached(
            "INSERT OR IGNORE INTO water_enforcements
             (ai_combined, county_id, upload_id, address, city, state, zip_code, program,
              enforcement_action, enforcement_number, enforcement_action_issued,
              case_closed, year, media)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?
        .execute(params![
            row.ai_combined,
            row.county_id,
            row.upload_id,
            row.address,
            row.city,
            row.state,
            row.zip_code,
            row.program,
            row.enforcement_action,
            row.enforcement_number,
            row.enforcement_action_issued.map(|d| d.to_string()),
            row.case_closed.map(|d| d.to_string()),
            row.year,
            row.media,
        ])?;
    Ok(changed > 0)
}

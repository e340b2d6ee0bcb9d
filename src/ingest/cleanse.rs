//! Field-level cleansing for raw open-data records.
//!
//! All functions are pure and total: malformed input becomes `None` (or `0`
//! for zip codes), never an error.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Serialize;
use serde_json::Value as Json;
use sha2::{Digest, Sha256};

static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\$?\s*(-?\d[\d,]*(?:\.\d+)?)").unwrap());

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Raw JSON object as delivered by the open-data export.
pub type RawRecord = serde_json::Map<String, Json>;

/// Parse a currency string such as `"$54,321.00"` or `"54,321 (est.)"`.
pub fn parse_wage(raw: &str) -> Option<f64> {
    let caps = LEADING_NUMBER.captures(raw)?;
    caps[1].replace(',', "").parse().ok()
}

/// Wage cell that may be a JSON number or a currency string.
pub fn wage_value(value: &Json) -> Option<f64> {
    match value {
        Json::Number(n) => n.as_f64(),
        Json::String(s) => parse_wage(s),
        _ => None,
    }
}

/// Leading segment of a hyphenated zip code, or `0` if it is not a number.
pub fn truncate_zip(raw: &str) -> i64 {
    raw.trim()
        .split('-')
        .next()
        .and_then(|head| head.trim().parse().ok())
        .unwrap_or(0)
}

/// Parts of a `"City, ST 12345"` field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CityStateZip {
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// Split a combined `city, state zip` field on commas.
///
/// The zip is either a third comma-separated part or the whitespace
/// separated tail of the second.
pub fn split_city_state_zip(raw: &str) -> CityStateZip {
    let mut parts = raw.split(',').map(str::trim);
    let city = parts.next().and_then(non_empty);
    let second = parts.next().unwrap_or("");
    let third = parts.next().and_then(non_empty);

    let (state, zip) = match third {
        Some(zip) => (non_empty(second), Some(zip)),
        None => {
            let mut tokens = second.split_whitespace();
            (tokens.next().map(str::to_string), tokens.next().map(str::to_string))
        }
    };

    CityStateZip { city, state, zip }
}

/// Join two identifier columns with `separator`, skipping missing halves.
pub fn combine_columns(first: Option<&str>, second: Option<&str>, separator: &str) -> Option<String> {
    match (first.and_then(non_empty), second.and_then(non_empty)) {
        (Some(a), Some(b)) => Some(format!("{a}{separator}{b}")),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// Parse the date formats seen in the feeds. Times are discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok().map(|dt| dt.date()))
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(raw, f).ok())
        })
}

/// A year cell: a bare integer, a numeric string or a date.
pub fn parse_year(value: &Json) -> Option<i32> {
    match value {
        Json::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Json::String(s) => s
            .trim()
            .parse()
            .ok()
            .or_else(|| parse_date(s).map(|d| d.year())),
        _ => None,
    }
}

/// Text view of a record field. Blank strings are `None`; non-string
/// scalars are rendered; objects and arrays are kept as compact JSON.
pub fn field_text(record: &RawRecord, key: &str) -> Option<String> {
    match record.get(key)? {
        Json::Null => None,
        Json::String(s) => non_empty(s),
        Json::Number(n) => Some(n.to_string()),
        Json::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// First present field among `keys`.
pub fn first_field(record: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| field_text(record, k))
}

/// SHA-256 of the canonical JSON encoding of `value`.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    Ok(sha256_hex(json.as_bytes()))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

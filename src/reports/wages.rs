//! Average wage per (county, year).

use serde::Serialize;

use crate::resolution::{QueryIntent, QueryVariant};
use crate::warehouse::{FromRow, Row, WarehouseResult};

pub const DEFAULT_LIMIT: u32 = 1000;

const PARAMS: &[&str] = &["county", "year", "limit"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WageSummary {
    pub county: String,
    pub year: i64,
    pub average_wage: Option<f64>,
}

impl FromRow for WageSummary {
    fn from_row(row: &Row) -> WarehouseResult<Self> {
        Ok(Self {
            county: row.text("county")?,
            year: row.integer("year")?,
            average_wage: row.opt_real("average_wage")?,
        })
    }
}

pub static VARIANTS: [QueryVariant; 3] = [
    QueryVariant {
        intent: QueryIntent::WageSummary,
        ordinal: 1,
        name: "per_source",
        template: "
SELECT c.county_name AS county,
       w.year AS year,
       w.wage_for_county AS average_wage
FROM wage_per_county w
JOIN counties c ON c.county_id = w.county_id
WHERE w.year IS NOT NULL
  AND (:county IS NULL OR c.county_name LIKE :county)
  AND (:year IS NULL OR w.year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::WageSummary,
        ordinal: 2,
        name: "normalized_wage_for_county",
        template: "
SELECT COALESCE(c.name, w.county) AS county,
       w.year AS year,
       w.wage_for_county AS average_wage
FROM wages w
LEFT JOIN counties c ON c.id = w.county_id
WHERE w.year IS NOT NULL
  AND COALESCE(c.name, w.county) IS NOT NULL
  AND (:county IS NULL OR COALESCE(c.name, w.county) LIKE :county)
  AND (:year IS NULL OR w.year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::WageSummary,
        ordinal: 3,
        name: "normalized_average_wage",
        template: "
SELECT COALESCE(c.name, w.county) AS county,
       w.year AS year,
       w.average_wage AS average_wage
FROM wages w
LEFT JOIN counties c ON c.id = w.county_id
WHERE w.year IS NOT NULL
  AND COALESCE(c.name, w.county) IS NOT NULL
  AND (:county IS NULL OR COALESCE(c.name, w.county) LIKE :county)
  AND (:year IS NULL OR w.year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
];

//! Enforcement counts grouped by (county, year).

use serde::Serialize;

use crate::resolution::{QueryIntent, QueryVariant};
use crate::warehouse::{FromRow, Row, WarehouseResult};

pub const DEFAULT_LIMIT: u32 = 500;

const PARAMS: &[&str] = &["county", "year", "source", "limit"];

/// `source` is the lexicographically first label in the group, not a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnforcementSummary {
    pub county: String,
    pub year: i64,
    pub total_enforcements: i64,
    pub source: Option<String>,
}

impl FromRow for EnforcementSummary {
    fn from_row(row: &Row) -> WarehouseResult<Self> {
        Ok(Self {
            county: row.text("county")?,
            year: row.integer("year")?,
            total_enforcements: row.integer("total_enforcements")?,
            source: row.opt_text("source")?,
        })
    }
}

pub static VARIANTS: [QueryVariant; 3] = [
    QueryVariant {
        intent: QueryIntent::EnforcementSummary,
        ordinal: 1,
        name: "per_source",
        template: "
WITH all_enf AS (
    SELECT county_id, year AS yr, 'air' AS src FROM air_enforcements
    UNION ALL
    SELECT county_id, year AS yr, 'water' AS src FROM water_enforcements
)
SELECT c.county_name AS county,
       e.yr AS year,
       COUNT(*) AS total_enforcements,
       MIN(e.src) AS source
FROM all_enf e
JOIN counties c ON c.county_id = e.county_id
WHERE e.yr IS NOT NULL
  AND (:county IS NULL OR c.county_name LIKE :county)
  AND (:year IS NULL OR e.yr = :year)
  AND (:source IS NULL OR e.src = :source)
GROUP BY c.county_name, e.yr
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::EnforcementSummary,
        ordinal: 2,
        name: "per_source_undated",
        template: "
WITH all_enf AS (
    SELECT county_id,
           CASE WHEN substr(achieved_date, 5, 1) = '-'
                THEN CAST(substr(achieved_date, 1, 4) AS INTEGER) END AS yr,
           'air' AS src
    FROM air_enforcements
    UNION ALL
    SELECT county_id,
           CASE WHEN substr(COALESCE(enforcement_action_issued, case_closed), 5, 1) = '-'
                THEN CAST(substr(COALESCE(enforcement_action_issued, case_closed), 1, 4) AS INTEGER) END AS yr,
           'water' AS src
    FROM water_enforcements
)
SELECT c.county_name AS county,
       e.yr AS year,
       COUNT(*) AS total_enforcements,
       MIN(e.src) AS source
FROM all_enf e
JOIN counties c ON c.county_id = e.county_id
WHERE e.yr IS NOT NULL
  AND (:county IS NULL OR c.county_name LIKE :county)
  AND (:year IS NULL OR e.yr = :year)
  AND (:source IS NULL OR e.src = :source)
GROUP BY c.county_name, e.yr
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::EnforcementSummary,
        ordinal: 3,
        name: "normalized",
        template: "
WITH all_enf AS (
    SELECT COALESCE(c.name, e.county) AS county,
           COALESCE(CASE WHEN substr(e.action_date, 5, 1) = '-'
                         THEN CAST(substr(e.action_date, 1, 4) AS INTEGER) END,
                    e.year) AS yr,
           LOWER(e.source) AS src
    FROM enforcements e
    LEFT JOIN counties c ON c.id = e.county_id
)
SELECT county,
       yr AS year,
       COUNT(*) AS total_enforcements,
       MIN(src) AS source
FROM all_enf
WHERE yr IS NOT NULL
  AND county IS NOT NULL
  AND (:county IS NULL OR county LIKE :county)
  AND (:year IS NULL OR yr = :year)
  AND (:source IS NULL OR src = :source)
GROUP BY county, yr
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
];

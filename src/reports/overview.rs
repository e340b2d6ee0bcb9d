//! Enforcement counts merged with average wages per (county, year).

use serde::Serialize;

use crate::resolution::{QueryIntent, QueryVariant};
use crate::warehouse::{FromRow, Row, WarehouseResult};

pub const DEFAULT_LIMIT: u32 = 1000;

const PARAMS: &[&str] = &["county", "year", "limit"];

/// One merged (county, year) cell.
///
/// A county/year with wages but no enforcement rows has
/// `total_enforcements == 0`; the reverse has `average_wage == None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub county: String,
    pub year: i64,
    pub total_enforcements: i64,
    pub average_wage: Option<f64>,
}

impl FromRow for ReportRow {
    fn from_row(row: &Row) -> WarehouseResult<Self> {
        Ok(Self {
            county: row.text("county")?,
            year: row.integer("year")?,
            total_enforcements: row.opt_integer("total_enforcements")?.unwrap_or(0),
            average_wage: row.opt_real("average_wage")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewResponse {
    pub items: Vec<ReportRow>,
    pub count: usize,
}

impl From<Vec<ReportRow>> for OverviewResponse {
    fn from(items: Vec<ReportRow>) -> Self {
        Self {
            count: items.len(),
            items,
        }
    }
}

pub static VARIANTS: [QueryVariant; 4] = [
    QueryVariant {
        intent: QueryIntent::Overview,
        ordinal: 1,
        name: "aggregate_view",
        template: "
SELECT county,
       CAST(year AS INTEGER) AS year,
       CAST(total_enforcements AS INTEGER) AS total_enforcements,
       CAST(average_wage AS REAL) AS average_wage
FROM mv_overview_agg
WHERE county IS NOT NULL AND year IS NOT NULL
  AND (:county IS NULL OR county LIKE :county)
  AND (:year IS NULL OR year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::Overview,
        ordinal: 2,
        name: "per_source",
        template: "
WITH all_enf AS (
    SELECT county_id, year FROM air_enforcements
    UNION ALL
    SELECT county_id, year FROM water_enforcements
),
enforcement_counts AS (
    SELECT c.county_name AS county, e.year AS year, COUNT(*) AS total_enforcements
    FROM all_enf e
    JOIN counties c ON c.county_id = e.county_id
    WHERE e.year IS NOT NULL
    GROUP BY c.county_name, e.year
),
wages_norm AS (
    SELECT c.county_name AS county, w.year AS year, w.wage_for_county AS average_wage
    FROM wage_per_county w
    JOIN counties c ON c.county_id = w.county_id
),
merged AS (
    SELECT COALESCE(w.county, e.county) AS county,
           COALESCE(w.year, e.year) AS year,
           COALESCE(e.total_enforcements, 0) AS total_enforcements,
           w.average_wage AS average_wage
    FROM wages_norm w
    FULL OUTER JOIN enforcement_counts e ON e.county = w.county AND e.year = w.year
)
SELECT county, year, total_enforcements, average_wage
FROM merged
WHERE county IS NOT NULL AND year IS NOT NULL
  AND (:county IS NULL OR county LIKE :county)
  AND (:year IS NULL OR year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::Overview,
        ordinal: 3,
        name: "per_source_undated",
        template: "
WITH all_enf AS (
    SELECT county_id,
           CASE WHEN substr(achieved_date, 5, 1) = '-'
                THEN CAST(substr(achieved_date, 1, 4) AS INTEGER) END AS year
    FROM air_enforcements
    UNION ALL
    SELECT county_id,
           CASE WHEN substr(COALESCE(enforcement_action_issued, case_closed), 5, 1) = '-'
                THEN CAST(substr(COALESCE(enforcement_action_issued, case_closed), 1, 4) AS INTEGER) END AS year
    FROM water_enforcements
),
enforcement_counts AS (
    SELECT c.county_name AS county, e.year AS year, COUNT(*) AS total_enforcements
    FROM all_enf e
    JOIN counties c ON c.county_id = e.county_id
    WHERE e.year IS NOT NULL
    GROUP BY c.county_name, e.year
),
wages_norm AS (
    SELECT c.county_name AS county, w.year AS year, w.wage_for_county AS average_wage
    FROM wage_per_county w
    JOIN counties c ON c.county_id = w.county_id
),
merged AS (
    SELECT COALESCE(w.county, e.county) AS county,
           COALESCE(w.year, e.year) AS year,
           COALESCE(e.total_enforcements, 0) AS total_enforcements,
           w.average_wage AS average_wage
    FROM wages_norm w
    FULL OUTER JOIN enforcement_counts e ON e.county = w.county AND e.year = w.year
)
SELECT county, year, total_enforcements, average_wage
FROM merged
WHERE county IS NOT NULL AND year IS NOT NULL
  AND (:county IS NULL OR county LIKE :county)
  AND (:year IS NULL OR year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::Overview,
        ordinal: 4,
        name: "normalized",
        template: "
WITH enforcement_counts AS (
    SELECT COALESCE(c.name, e.county) AS county,
           COALESCE(CASE WHEN substr(e.action_date, 5, 1) = '-'
                         THEN CAST(substr(e.action_date, 1, 4) AS INTEGER) END,
                    e.year) AS year,
           COUNT(*) AS total_enforcements
    FROM enforcements e
    LEFT JOIN counties c ON c.id = e.county_id
    GROUP BY 1, 2
),
wages_norm AS (
    SELECT COALESCE(c.name, w.county) AS county, w.year AS year, w.average_wage AS average_wage
    FROM wages w
    LEFT JOIN counties c ON c.id = w.county_id
),
merged AS (
    SELECT COALESCE(w.county, e.county) AS county,
           COALESCE(w.year, e.year) AS year,
           COALESCE(e.total_enforcements, 0) AS total_enforcements,
           w.average_wage AS average_wage
    FROM wages_norm w
    FULL OUTER JOIN enforcement_counts e ON e.county = w.county AND e.year = w.year
)
SELECT county, year, total_enforcements, average_wage
FROM merged
WHERE county IS NOT NULL AND year IS NOT NULL
  AND (:county IS NULL OR county LIKE :county)
  AND (:year IS NULL OR year = :year)
ORDER BY county, year
LIMIT :limit",
        params: PARAMS,
    },
];

//! County listing.

use serde::Serialize;

use crate::resolution::{QueryIntent, QueryVariant};
use crate::warehouse::{FromRow, Row, WarehouseResult};

pub const DEFAULT_LIMIT: u32 = 1000;

const PARAMS: &[&str] = &["name", "state", "limit"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyRow {
    pub id: i64,
    pub name: String,
    pub state: Option<String>,
}

impl FromRow for CountyRow {
    fn from_row(row: &Row) -> WarehouseResult<Self> {
        Ok(Self {
            id: row.integer("id")?,
            name: row.text("name")?,
            state: row.opt_text("state")?,
        })
    }
}

pub static VARIANTS: [QueryVariant; 3] = [
    QueryVariant {
        intent: QueryIntent::CountyList,
        ordinal: 1,
        name: "per_source",
        template: "
SELECT county_id AS id, county_name AS name, state
FROM counties
WHERE (:name IS NULL OR county_name LIKE :name)
  AND (:state IS NULL OR state = :state)
ORDER BY county_name
LIMIT :limit",
        params: PARAMS,
    },
    QueryVariant {
        intent: QueryIntent::CountyList,
        ordinal: 2,
        name: "normalized",
        template: "
SELECT id, name, state
FROM counties
WHERE (:name IS NULL OR name LIKE :name)
  AND (:state IS NULL OR state = :state)
ORDER BY name
LIMIT :limit",
        params: PARAMS,
    },
    // No state column: a state filter cannot match anything.
    QueryVariant {
        intent: QueryIntent::CountyList,
        ordinal: 3,
        name: "normalized_stateless",
        template: "
SELECT id, name, NULL AS state
FROM counties
WHERE (:name IS NULL OR name LIKE :name)
  AND :state IS NULL
ORDER BY name
LIMIT :limit",
        params: PARAMS,
    },
];

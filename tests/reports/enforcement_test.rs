//! Integration tests for the enforcement summary.

#[path = "../common/mod.rs"]
mod common;

use mdwarehouse::config::ApiSettings;
use mdwarehouse::reports::{
    EnforcementFilter, EnforcementSource, EnforcementSummary, ReportFilter, ReportService,
};
use mdwarehouse::warehouse::SqliteWarehouse;

fn seeded() -> ReportService<SqliteWarehouse> {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Allegany");
    common::add_county(&wh, 2, "Frederick");
    common::add_air(&wh, "a1", 1, "2020-01-10");
    common::add_water(&wh, "w1", 1, "2020-02-11");
    common::add_water(&wh, "w2", 1, "2021-05-05");
    common::add_water(&wh, "w3", 2, "2020-06-06");
    ReportService::new(wh, ApiSettings::default())
}

#[test]
fn test_groups_by_county_and_year() {
    let rows = seeded()
        .get_enforcement_summary(&EnforcementFilter::default())
        .unwrap();

    assert_eq!(
        rows,
        vec![
            EnforcementSummary {
                county: "Allegany".into(),
                year: 2020,
                total_enforcements: 2,
                source: Some("air".into()),
            },
            EnforcementSummary {
                county: "Allegany".into(),
                year: 2021,
                total_enforcements: 1,
                source: Some("water".into()),
            },
            EnforcementSummary {
                county: "Frederick".into(),
                year: 2020,
                total_enforcements: 1,
                source: Some("water".into()),
            },
        ]
    );
}

#[test]
fn test_source_filter_applies_before_grouping() {
    let filter = EnforcementFilter::default().source(EnforcementSource::Water);
    let rows = seeded().get_enforcement_summary(&filter).unwrap();

    let allegany_2020 = rows
        .iter()
        .find(|r| r.county == "Allegany" && r.year == 2020)
        .unwrap();
    assert_eq!(allegany_2020.total_enforcements, 1);
    assert!(rows.iter().all(|r| r.source.as_deref() == Some("water")));
}

#[test]
fn test_county_and_year_filters() {
    let filter: EnforcementFilter = ReportFilter::default().county("FRED").year(2020).into();
    let rows = seeded().get_enforcement_summary(&filter).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].county, "Frederick");
}

#[test]
fn test_normalized_table_uses_lowercased_source() {
    let wh = common::normalized();
    wh.execute_batch(
        "INSERT INTO counties VALUES (1, 'Howard', 'MD');
         INSERT INTO enforcements VALUES (1, NULL, 'WATER', 2019, NULL);
         INSERT INTO enforcements VALUES (1, NULL, 'Air', 2019, NULL);
         INSERT INTO enforcements VALUES (1, NULL, 'Air', NULL, NULL);",
    )
    .unwrap();
    let svc = ReportService::new(wh, ApiSettings::default());

    let rows = svc
        .get_enforcement_summary(&EnforcementFilter::default())
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].total_enforcements, 2);
    assert_eq!(rows[0].source.as_deref(), Some("air"));

    let water = svc
        .get_enforcement_summary(&EnforcementFilter::default().source(EnforcementSource::Water))
        .unwrap();
    assert_eq!(water[0].total_enforcements, 1);
}

#[test]
fn test_undated_tables_fall_back_to_case_closed() {
    let wh = SqliteWarehouse::open_in_memory().unwrap();
    wh.execute_batch(
        "CREATE TABLE counties (county_id INTEGER PRIMARY KEY, county_name TEXT, state TEXT);
         CREATE TABLE air_enforcements (ai_combined TEXT PRIMARY KEY, county_id INTEGER, achieved_date TEXT);
         CREATE TABLE water_enforcements (
             ai_combined TEXT PRIMARY KEY, county_id INTEGER,
             enforcement_action_issued TEXT, case_closed TEXT
         );
         CREATE TABLE wage_per_county (county_id INTEGER, year INTEGER, wage_for_county REAL);
         INSERT INTO counties VALUES (1, 'Garrett', 'MD');
         INSERT INTO air_enforcements VALUES ('a1', 1, 'n/a');
         INSERT INTO water_enforcements VALUES ('w1', 1, NULL, '2017-09-30');
         INSERT INTO water_enforcements VALUES ('w2', 1, '2016-03-01', '2017-01-01');",
    )
    .unwrap();
    let svc = ReportService::new(wh, ApiSettings::default());

    let rows = svc
        .get_enforcement_summary(&EnforcementFilter::default())
        .unwrap();
    let years: Vec<_> = rows.iter().map(|r| (r.year, r.total_enforcements)).collect();
    assert_eq!(years, vec![(2016, 1), (2017, 1)]);

    let overview = svc.get_overview(&ReportFilter::default()).unwrap();
    let overview_years: Vec<_> = overview
        .items
        .iter()
        .map(|r| (r.year, r.total_enforcements))
        .collect();
    assert_eq!(overview_years, years);
}

#[test]
fn test_normalized_prefers_action_date_year() {
    let wh = common::normalized();
    wh.execute_batch(
        "INSERT INTO counties VALUES (1, 'Howard', 'MD');
         INSERT INTO enforcements VALUES (1, NULL, 'air', NULL, '2022-02-02');
         INSERT INTO enforcements VALUES (1, NULL, 'water', 2020, '2021-07-07');",
    )
    .unwrap();
    let svc = ReportService::new(wh, ApiSettings::default());

    let rows = svc
        .get_enforcement_summary(&EnforcementFilter::default())
        .unwrap();
    let years: Vec<_> = rows.iter().map(|r| r.year).collect();
    assert_eq!(years, vec![2021, 2022]);

    let overview = svc.get_overview(&ReportFilter::default()).unwrap();
    let overview_years: Vec<_> = overview.items.iter().map(|r| r.year).collect();
    assert_eq!(overview_years, years);
}

//! Integration tests for the overview report across schema generations.

#[path = "../common/mod.rs"]
mod common;

use insta::assert_snapshot;
use mdwarehouse::config::ApiSettings;
use mdwarehouse::reports::{ReportError, ReportFilter, ReportRow, ReportService};
use mdwarehouse::resolution::{QueryIntent, ResolutionError};
use mdwarehouse::warehouse::{QueryParams, SqliteWarehouse};

fn service(wh: SqliteWarehouse) -> ReportService<SqliteWarehouse> {
    ReportService::new(wh, ApiSettings::default())
}

fn winner(svc: &ReportService<SqliteWarehouse>) -> &'static str {
    let params = QueryParams::new().with("limit", 10);
    svc.engine()
        .resolve(QueryIntent::Overview, &params)
        .winner()
        .map(|v| v.name)
        .unwrap_or("none")
}

// ============================================================================
// Per-source generation
// ============================================================================

#[test]
fn test_full_outer_join_keeps_both_sides() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Allegany");
    common::add_county(&wh, 2, "Baltimore");
    common::add_wage(&wh, 1, 2020, Some(50000.0));
    common::add_air(&wh, "a1", 2, "2020-03-01");
    common::add_water(&wh, "w1", 2, "2020-07-01");

    let svc = service(wh);
    let resp = svc.get_overview(&ReportFilter::default()).unwrap();

    assert_eq!(resp.count, 2);
    assert_eq!(
        resp.items[0],
        ReportRow {
            county: "Allegany".into(),
            year: 2020,
            total_enforcements: 0,
            average_wage: Some(50000.0),
        }
    );
    assert_eq!(resp.items[1].county, "Baltimore");
    assert_eq!(resp.items[1].total_enforcements, 2);
    assert_eq!(resp.items[1].average_wage, None);
    assert_eq!(winner(&svc), "per_source");

    assert_snapshot!(
        serde_json::to_string(&resp).unwrap(),
        @r#"{"items":[{"county":"Allegany","year":2020,"total_enforcements":0,"average_wage":50000.0},{"county":"Baltimore","year":2020,"total_enforcements":2,"average_wage":null}],"count":2}"#
    );
}

#[test]
fn test_sorted_by_county_then_year() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Washington");
    common::add_county(&wh, 2, "Cecil");
    common::add_wage(&wh, 1, 2021, Some(1.0));
    common::add_wage(&wh, 1, 2019, Some(1.0));
    common::add_wage(&wh, 2, 2020, Some(1.0));

    let resp = service(wh).get_overview(&ReportFilter::default()).unwrap();
    let keys: Vec<_> = resp
        .items
        .iter()
        .map(|r| (r.county.as_str(), r.year))
        .collect();
    assert_eq!(
        keys,
        vec![("Cecil", 2020), ("Washington", 2019), ("Washington", 2021)]
    );
}

#[test]
fn test_county_and_year_filters() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Baltimore City");
    common::add_county(&wh, 2, "Kent");
    common::add_wage(&wh, 1, 2019, Some(1.0));
    common::add_wage(&wh, 1, 2020, Some(2.0));
    common::add_wage(&wh, 2, 2020, Some(3.0));

    let svc = service(wh);
    let resp = svc
        .get_overview(&ReportFilter::default().county("balt").year(2020))
        .unwrap();
    assert_eq!(resp.count, 1);
    assert_eq!(resp.items[0].county, "Baltimore City");
    assert_eq!(resp.items[0].average_wage, Some(2.0));

    let resp = svc
        .get_overview(&ReportFilter::default().county("   "))
        .unwrap();
    assert_eq!(resp.count, 3);
}

#[test]
fn test_limit_is_clamped() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Kent");
    common::add_wage(&wh, 1, 2019, Some(1.0));
    common::add_wage(&wh, 1, 2020, Some(1.0));

    let resp = service(wh)
        .get_overview(&ReportFilter::default().limit(0))
        .unwrap();
    assert_eq!(resp.count, 1);
}

#[test]
fn test_enforcements_without_year_are_excluded() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Kent");
    common::add_air(&wh, "a1", 1, "unknown");
    common::add_air(&wh, "a2", 1, "2018-01-01");

    let resp = service(wh).get_overview(&ReportFilter::default()).unwrap();
    assert_eq!(resp.count, 1);
    assert_eq!(resp.items[0].year, 2018);
    assert_eq!(resp.items[0].total_enforcements, 1);
}

#[test]
fn test_invalid_year_is_rejected() {
    let svc = service(common::per_source());
    let err = svc
        .get_overview(&ReportFilter::default().year(1850))
        .unwrap_err();
    assert!(matches!(err, ReportError::InvalidParameter { name: "year", .. }));
}

// ============================================================================
// Other generations
// ============================================================================

#[test]
fn test_aggregate_view_wins_when_present() {
    let wh = common::aggregate_view(&[
        ("Kent", 2020, 4, Some(48000.0)),
        ("Cecil", 2020, 1, None),
    ]);
    let svc = service(wh);
    assert_eq!(winner(&svc), "aggregate_view");

    let resp = svc.get_overview(&ReportFilter::default()).unwrap();
    assert_eq!(resp.items[0].county, "Cecil");
    assert_eq!(resp.items[0].average_wage, None);
    assert_eq!(resp.items[1].total_enforcements, 4);
}

#[test]
fn test_undated_per_source_tables() {
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
         INSERT INTO air_enforcements VALUES ('a1', 1, '2017-04-02T00:00:00.000');
         INSERT INTO water_enforcements VALUES ('w1', 1, NULL, '2017-09-30');
         INSERT INTO wage_per_county VALUES (1, 2017, 39000.0);",
    )
    .unwrap();

    let svc = service(wh);
    assert_eq!(winner(&svc), "per_source_undated");

    let resp = svc.get_overview(&ReportFilter::default()).unwrap();
    assert_eq!(
        resp.items,
        vec![ReportRow {
            county: "Garrett".into(),
            year: 2017,
            total_enforcements: 2,
            average_wage: Some(39000.0),
        }]
    );
}

#[test]
fn test_normalized_tables() {
    let wh = common::normalized();
    wh.execute_batch(
        "INSERT INTO counties VALUES (1, 'Howard', 'MD');
         INSERT INTO enforcements VALUES (1, NULL, 'AIR', NULL, '2022-02-02');
         INSERT INTO enforcements VALUES (NULL, 'Talbot', 'water', 2022, NULL);
         INSERT INTO wages VALUES (1, NULL, 2022, 70000.0);",
    )
    .unwrap();

    let svc = service(wh);
    assert_eq!(winner(&svc), "normalized");

    let resp = svc.get_overview(&ReportFilter::default()).unwrap();
    assert_eq!(resp.count, 2);
    assert_eq!(resp.items[0].county, "Howard");
    assert_eq!(resp.items[0].total_enforcements, 1);
    assert_eq!(resp.items[0].average_wage, Some(70000.0));
    assert_eq!(resp.items[1].county, "Talbot");
    assert_eq!(resp.items[1].average_wage, None);
}

#[test]
fn test_no_known_schema_is_exhausted() {
    let svc = service(SqliteWarehouse::open_in_memory().unwrap());
    let err = svc.get_overview(&ReportFilter::default()).unwrap_err();
    match err {
        ReportError::Resolution(ResolutionError::Exhausted {
            intent,
            variant,
            attempts,
            ..
        }) => {
            assert_eq!(intent, QueryIntent::Overview);
            assert_eq!(variant, "normalized");
            assert_eq!(attempts, 4);
        }
        other => panic!("unexpected error: {other}"),
    }
}

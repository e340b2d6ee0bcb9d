//! Integration tests for the county listing.

#[path = "../common/mod.rs"]
mod common;

use mdwarehouse::config::ApiSettings;
use mdwarehouse::reports::{CountyFilter, CountyRow, ReportService};
use mdwarehouse::warehouse::SqliteWarehouse;

fn filter(name: Option<&str>, state: Option<&str>) -> CountyFilter {
    CountyFilter {
        name: name.map(String::from),
        state: state.map(String::from),
        limit: None,
    }
}

#[test]
fn test_per_source_counties() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Talbot");
    common::add_county(&wh, 2, "Anne Arundel");
    common::add_county(&wh, 3, "Outside of Maryland");
    let svc = ReportService::new(wh, ApiSettings::default());

    let all = svc.list_counties(&CountyFilter::default()).unwrap();
    let names: Vec<_> = all.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Anne Arundel", "Outside of Maryland", "Talbot"]);

    let md = svc.list_counties(&filter(None, Some("MD"))).unwrap();
    assert_eq!(md.len(), 2);

    let hit = svc.list_counties(&filter(Some("arun"), None)).unwrap();
    assert_eq!(
        hit,
        vec![CountyRow {
            id: 2,
            name: "Anne Arundel".into(),
            state: Some("MD".into()),
        }]
    );
}

#[test]
fn test_stateless_normalized_counties() {
    let wh = SqliteWarehouse::open_in_memory().unwrap();
    wh.execute_batch(
        "CREATE TABLE counties (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         INSERT INTO counties VALUES (1, 'Harford'), (2, 'Dorchester');",
    )
    .unwrap();
    let svc = ReportService::new(wh, ApiSettings::default());

    let rows = svc.list_counties(&CountyFilter::default()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Dorchester");
    assert_eq!(rows[0].state, None);

    assert!(svc
        .list_counties(&filter(None, Some("MD")))
        .unwrap()
        .is_empty());
}

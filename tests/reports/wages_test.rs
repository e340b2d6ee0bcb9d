//! Integration tests for the wage listing.

#[path = "../common/mod.rs"]
mod common;

use mdwarehouse::config::ApiSettings;
use mdwarehouse::reports::{ReportFilter, ReportService, WageSummary};

#[test]
fn test_year_filter_returns_only_that_year_sorted() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Worcester");
    common::add_county(&wh, 2, "Carroll");
    common::add_county(&wh, 3, "Kent");
    for id in 1..=3 {
        common::add_wage(&wh, id, 2019, Some(40000.0 + id as f64));
        common::add_wage(&wh, id, 2020, Some(50000.0 + id as f64));
    }
    let svc = ReportService::new(wh, ApiSettings::default());

    let rows = svc.list_wages(&ReportFilter::default().year(2020)).unwrap();

    assert_eq!(
        rows,
        vec![
            WageSummary {
                county: "Carroll".into(),
                year: 2020,
                average_wage: Some(50002.0),
            },
            WageSummary {
                county: "Kent".into(),
                year: 2020,
                average_wage: Some(50003.0),
            },
            WageSummary {
                county: "Worcester".into(),
                year: 2020,
                average_wage: Some(50001.0),
            },
        ]
    );
}

#[test]
fn test_null_wage_is_kept() {
    let wh = common::per_source();
    common::add_county(&wh, 1, "Somerset");
    common::add_wage(&wh, 1, 2018, None);
    let svc = ReportService::new(wh, ApiSettings::default());

    let rows = svc.list_wages(&ReportFilter::default()).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].average_wage, None);
}

#[test]
fn test_normalized_average_wage_column() {
    let wh = common::normalized();
    wh.execute_batch(
        "INSERT INTO counties VALUES (1, 'Howard', 'MD');
         INSERT INTO wages VALUES (1, NULL, 2021, 81000.0);
         INSERT INTO wages VALUES (NULL, 'Talbot', 2021, 52000.0);
         INSERT INTO wages VALUES (NULL, NULL, 2021, 1.0);",
    )
    .unwrap();
    let svc = ReportService::new(wh, ApiSettings::default());

    let winner = svc
        .engine()
        .resolve(
            mdwarehouse::resolution::QueryIntent::WageSummary,
            &mdwarehouse::warehouse::QueryParams::new().with("limit", 10),
        )
        .winner()
        .map(|v| v.name);
    assert_eq!(winner, Some("normalized_average_wage"));

    let rows = svc
        .list_wages(&ReportFilter::default().county("tal"))
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].county, "Talbot");
    assert_eq!(rows[0].average_wage, Some(52000.0));

    assert_eq!(svc.list_wages(&ReportFilter::default()).unwrap().len(), 2);
}

//! Integration tests for ordered variant resolution.

use std::sync::Mutex;

use mdwarehouse::resolution::{
    try_variants, QueryEngine, QueryIntent, QueryVariant, Resolution, ResolutionError,
    VariantRegistry,
};
use mdwarehouse::warehouse::{
    QueryParams, Row, SqliteWarehouse, Value, Warehouse, WarehouseError, WarehouseResult,
};

/// Stub that fails the first `failures` calls and records every statement.
struct FailThenSucceed {
    failures: usize,
    calls: Mutex<Vec<String>>,
    seen_params: Mutex<Vec<QueryParams>>,
}

impl FailThenSucceed {
    fn new(failures: usize) -> Self {
        Self {
            failures,
            calls: Mutex::new(Vec::new()),
            seen_params: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Warehouse for FailThenSucceed {
    fn fetch_all(&self, sql: &str, params: &QueryParams) -> WarehouseResult<Vec<Row>> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(sql.to_string());
        self.seen_params.lock().unwrap().push(params.clone());
        if calls.len() <= self.failures {
            return Err(WarehouseError::Unavailable(format!("no such table ({sql})")));
        }
        Ok(vec![Row::from_pairs([("answer", Value::from(sql))])])
    }

    fn ping(&self) -> WarehouseResult<()> {
        Ok(())
    }
}

fn variant(ordinal: u32, name: &'static str, template: &'static str) -> QueryVariant {
    QueryVariant {
        intent: QueryIntent::Overview,
        ordinal,
        name,
        template,
        params: &["limit"],
    }
}

// ============================================================================
// Short-circuiting
// ============================================================================

#[test]
fn test_later_variants_never_run_after_success() {
    let variants = [
        variant(1, "first", "q1"),
        variant(2, "second", "q2"),
        variant(3, "third", "q3"),
        variant(4, "fourth", "q4"),
    ];
    let refs: Vec<&QueryVariant> = variants.iter().collect();

    for failures in 0..variants.len() {
        let stub = FailThenSucceed::new(failures);
        let resolution = try_variants(&stub, &refs, &QueryParams::new());

        assert_eq!(resolution.winner().map(|v| v.ordinal), Some(failures as u32 + 1));
        assert_eq!(stub.calls().len(), failures + 1);
    }
}

#[test]
fn test_variants_run_in_ordinal_order_regardless_of_listing() {
    let a = variant(3, "slow", "slow");
    let b = variant(1, "fast", "fast");
    let c = variant(2, "medium", "medium");
    let stub = FailThenSucceed::new(2);

    let resolution = try_variants(&stub, &[&a, &b, &c], &QueryParams::new());

    assert_eq!(stub.calls(), vec!["fast", "medium", "slow"]);
    assert_eq!(resolution.winner().map(|v| v.name), Some("slow"));
}

#[test]
fn test_empty_rows_still_win() {
    let wh = SqliteWarehouse::open_in_memory().unwrap();
    wh.execute_batch("CREATE TABLE present (x INTEGER);").unwrap();
    let first = variant(1, "empty", "SELECT x FROM present LIMIT :limit");
    let second = variant(2, "never", "SELECT 1 AS x LIMIT :limit");

    let resolution = try_variants(&wh, &[&first, &second], &QueryParams::new().with("limit", 5));
    match resolution {
        Resolution::Resolved { variant, rows } => {
            assert_eq!(variant.name, "empty");
            assert!(rows.is_empty());
        }
        other => panic!("expected a resolved variant, got {other:?}"),
    }
}

// ============================================================================
// Exhaustion and empty lists
// ============================================================================

#[test]
fn test_exhaustion_reports_last_error() {
    let wh = SqliteWarehouse::open_in_memory().unwrap();
    let first = variant(1, "view", "SELECT * FROM mv_missing LIMIT :limit");
    let second = variant(2, "raw", "SELECT * FROM raw_missing LIMIT :limit");
    let registry = VariantRegistry::new().with(&[first, second]);
    let engine = QueryEngine::new(wh, registry);

    let err = engine
        .execute_rows(QueryIntent::Overview, &QueryParams::new().with("limit", 1))
        .unwrap_err();
    let ResolutionError::Exhausted {
        variant,
        ordinal,
        attempts,
        source,
        ..
    } = &err
    else {
        panic!("expected exhaustion, got {err}");
    };
    assert_eq!(*variant, "raw");
    assert_eq!(*ordinal, 2);
    assert_eq!(*attempts, 2);
    assert!(source.to_string().contains("raw_missing"));
}

#[test]
fn test_no_variants_yields_empty_result() {
    let stub = FailThenSucceed::new(0);
    let engine = QueryEngine::new(&stub, VariantRegistry::new());

    let rows = engine
        .execute_rows(QueryIntent::WageSummary, &QueryParams::new())
        .unwrap();
    assert!(rows.is_empty());
    assert!(stub.calls().is_empty());
}

// ============================================================================
// Parameter contracts and decoding
// ============================================================================

#[test]
fn test_each_variant_sees_only_its_declared_params() {
    let narrow = QueryVariant {
        params: &["limit"],
        ..variant(1, "narrow", "q1")
    };
    let stub = FailThenSucceed::new(0);
    let params = QueryParams::new()
        .with("limit", 10)
        .with("county", "%kent%");

    try_variants(&stub, &[&narrow], &params);

    let seen = stub.seen_params.lock().unwrap();
    assert!(seen[0].contains("limit"));
    assert!(!seen[0].contains("county"));
}

#[test]
fn test_decode_failure_names_winning_variant() {
    #[derive(Debug)]
    struct NeedsCounty;

    impl mdwarehouse::warehouse::FromRow for NeedsCounty {
        fn from_row(row: &Row) -> WarehouseResult<Self> {
            row.text("county").map(|_| NeedsCounty)
        }
    }

    let stub = FailThenSucceed::new(0);
    let engine = QueryEngine::new(&stub, VariantRegistry::new().with(&[variant(1, "only", "q")]));

    let err = engine
        .execute::<NeedsCounty>(QueryIntent::Overview, &QueryParams::new())
        .unwrap_err();
    assert!(matches!(err, ResolutionError::Decode { variant: "only", .. }));
    assert_eq!(stub.calls().len(), 1);
}

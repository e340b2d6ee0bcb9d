//! Integration tests for the variant registry.

use mdwarehouse::reports::builtin_registry;
use mdwarehouse::resolution::{QueryIntent, QueryVariant, VariantIssue, VariantRegistry};

const BASE: QueryVariant = QueryVariant {
    intent: QueryIntent::CountyList,
    ordinal: 1,
    name: "base",
    template: "SELECT id, name FROM counties WHERE (:name IS NULL OR name LIKE :name) LIMIT :limit",
    params: &["name", "limit"],
};

#[test]
fn test_builtin_registry_is_consistent() {
    let registry = builtin_registry();
    if let Err(issues) = registry.validate() {
        let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
        panic!("builtin variants are invalid:\n{}", lines.join("\n"));
    }

    for intent in QueryIntent::ALL {
        let ordinals: Vec<u32> = registry
            .variants_for(intent)
            .iter()
            .map(|v| v.ordinal)
            .collect();
        assert!(!ordinals.is_empty(), "{intent} has no variants");
        assert!(ordinals.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn test_builtin_overview_order() {
    let registry = builtin_registry();
    let names: Vec<_> = registry
        .variants_for(QueryIntent::Overview)
        .iter()
        .map(|v| v.name)
        .collect();
    assert_eq!(
        names,
        vec!["aggregate_view", "per_source", "per_source_undated", "normalized"]
    );
}

#[test]
fn test_duplicate_ordinal_detected() {
    let twin = QueryVariant {
        name: "twin",
        ..BASE
    };
    let issues = VariantRegistry::new()
        .with(&[BASE, twin])
        .validate()
        .unwrap_err();
    assert_eq!(
        issues,
        vec![VariantIssue::DuplicateOrdinal {
            intent: QueryIntent::CountyList,
            ordinal: 1,
        }]
    );
}

#[test]
fn test_same_ordinal_in_other_intent_is_fine() {
    let other = QueryVariant {
        intent: QueryIntent::WageSummary,
        ..BASE
    };
    assert!(VariantRegistry::new().with(&[BASE, other]).validate().is_ok());
}

#[test]
fn test_parameter_contract_violations() {
    let undeclared = QueryVariant {
        ordinal: 2,
        name: "undeclared",
        params: &["limit"],
        ..BASE
    };
    let unused = QueryVariant {
        ordinal: 3,
        name: "unused",
        params: &["name", "state", "limit"],
        ..BASE
    };
    let issues = VariantRegistry::new()
        .with(&[undeclared, unused])
        .validate()
        .unwrap_err();

    assert!(issues.contains(&VariantIssue::UndeclaredParameter {
        variant: undeclared.to_string(),
        param: "name".into(),
    }));
    assert!(issues.contains(&VariantIssue::UnusedParameter {
        variant: unused.to_string(),
        param: "state".into(),
    }));
    assert_eq!(issues.len(), 2);
}

#[test]
fn test_unparseable_template() {
    let broken = QueryVariant {
        template: "SELEC id FROM counties LIMIT :limit",
        params: &["limit"],
        ..BASE
    };
    let two = QueryVariant {
        ordinal: 2,
        template: "SELECT 1 LIMIT :limit; SELECT 2",
        params: &["limit"],
        ..BASE
    };
    let issues = VariantRegistry::new()
        .with(&[broken, two])
        .validate()
        .unwrap_err();

    assert_eq!(issues.len(), 2);
    assert!(issues
        .iter()
        .all(|i| matches!(i, VariantIssue::Unparseable { .. })));
    assert!(issues[1].to_string().contains("found 2"));
}

//! Registry of query variants, grouped by intent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;

use super::variant::{QueryIntent, QueryVariant};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|[^:\w]):([A-Za-z_]\w*)").unwrap());

/// A problem found by [`VariantRegistry::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VariantIssue {
    #[error("{intent}: ordinal {ordinal} is used by more than one variant")]
    DuplicateOrdinal { intent: QueryIntent, ordinal: u32 },

    #[error("{variant}: template uses :{param} but does not declare it")]
    UndeclaredParameter { variant: String, param: String },

    #[error("{variant}: declares :{param} but the template never uses it")]
    UnusedParameter { variant: String, param: String },

    #[error("{variant}: template does not parse: {message}")]
    Unparseable { variant: String, message: String },
}

/// Placeholder names used by a template, without the leading `:`.
pub fn placeholders(template: &str) -> BTreeSet<String> {
    PLACEHOLDER
        .captures_iter(template)
        .map(|c| c[1].to_string())
        .collect()
}

/// All known variants. Adding a schema generation means adding data here,
/// not new control flow.
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    variants: BTreeMap<QueryIntent, Vec<QueryVariant>>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, variant: QueryVariant) -> &mut Self {
        self.variants.entry(variant.intent).or_default().push(variant);
        self
    }

    pub fn with(mut self, variants: &[QueryVariant]) -> Self {
        for v in variants {
            self.register(*v);
        }
        self
    }

    /// Variants for an intent in the order they are tried.
    pub fn variants_for(&self, intent: QueryIntent) -> Vec<&QueryVariant> {
        let mut list: Vec<&QueryVariant> = self
            .variants
            .get(&intent)
            .map(|v| v.iter().collect())
            .unwrap_or_default();
        list.sort_by_key(|v| v.ordinal);
        list
    }

    pub fn intents(&self) -> impl Iterator<Item = QueryIntent> + '_ {
        self.variants.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.variants.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check ordinals, parameter contracts and SQL syntax of every variant.
    pub fn validate(&self) -> Result<(), Vec<VariantIssue>> {
        let mut issues = Vec::new();

        for (intent, variants) in &self.variants {
            let mut seen = BTreeSet::new();
            for v in variants {
                if !seen.insert(v.ordinal) {
                    issues.push(VariantIssue::DuplicateOrdinal {
                        intent: *intent,
                        ordinal: v.ordinal,
                    });
                }
                issues.extend(check_variant(v));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

fn check_variant(v: &QueryVariant) -> Vec<VariantIssue> {
    let mut issues = Vec::new();
    let used = placeholders(v.template);

    for param in &used {
        if !v.accepts(param) {
            issues.push(VariantIssue::UndeclaredParameter {
                variant: v.to_string(),
                param: param.clone(),
            });
        }
    }
    for param in v.params {
        if !used.contains(*param) {
            issues.push(VariantIssue::UnusedParameter {
                variant: v.to_string(),
                param: param.to_string(),
            });
        }
    }

    match Parser::parse_sql(&SQLiteDialect {}, v.template) {
        Ok(statements) if statements.len() == 1 => {}
        Ok(statements) => issues.push(VariantIssue::Unparseable {
            variant: v.to_string(),
            message: format!("expected one statement, found {}", statements.len()),
        }),
        Err(e) => issues.push(VariantIssue::Unparseable {
            variant: v.to_string(),
            message: e.to_string(),
        }),
    }

    issues
}

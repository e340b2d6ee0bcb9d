//! Ordered fallback across query variants.

use crate::warehouse::{FromRow, QueryParams, Row, Warehouse, WarehouseError};

use super::registry::VariantRegistry;
use super::variant::{QueryIntent, QueryVariant};

/// Errors from resolving an intent.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("all {attempts} variants for {intent} failed; last was {variant} (#{ordinal}): {source}")]
    Exhausted {
        intent: QueryIntent,
        variant: &'static str,
        ordinal: u32,
        attempts: usize,
        #[source]
        source: WarehouseError,
    },

    #[error("rows from {variant} for {intent} could not be decoded: {source}")]
    Decode {
        intent: QueryIntent,
        variant: &'static str,
        #[source]
        source: WarehouseError,
    },
}

pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Outcome of trying an ordered list of variants.
#[derive(Debug)]
pub enum Resolution<'v> {
    /// A variant executed; its rows are the answer, even when empty.
    Resolved {
        variant: &'v QueryVariant,
        rows: Vec<Row>,
    },
    /// Every variant failed. Carries the last attempt and its error.
    Exhausted {
        variant: &'v QueryVariant,
        attempts: usize,
        error: WarehouseError,
    },
    /// There was nothing to try.
    NoVariants,
}

impl<'v> Resolution<'v> {
    pub fn winner(&self) -> Option<&'v QueryVariant> {
        match self {
            Resolution::Resolved { variant, .. } => Some(variant),
            _ => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }

    /// Rows of the winning variant. `NoVariants` is an empty answer.
    pub fn into_result(self, intent: QueryIntent) -> ResolutionResult<Vec<Row>> {
        match self {
            Resolution::Resolved { rows, .. } => Ok(rows),
            Resolution::NoVariants => Ok(Vec::new()),
            Resolution::Exhausted {
                variant,
                attempts,
                error,
            } => Err(ResolutionError::Exhausted {
                intent,
                variant: variant.name,
                ordinal: variant.ordinal,
                attempts,
                source: error,
            }),
        }
    }
}

/// Run `variants` in ascending ordinal order and stop at the first one
/// that executes.
///
/// Each variant receives only the parameters it declares. Success means the
/// statement ran; an empty row set still wins. Any data-access error moves on
/// to the next variant.
pub fn try_variants<'v, W: Warehouse + ?Sized>(
    warehouse: &W,
    variants: &[&'v QueryVariant],
    params: &QueryParams,
) -> Resolution<'v> {
    let mut ordered = variants.to_vec();
    ordered.sort_by_key(|v| v.ordinal);

    let mut last: Option<(&'v QueryVariant, WarehouseError)> = None;
    let mut attempts = 0;

    for variant in ordered {
        attempts += 1;
        let bound = params.restricted_to(variant.params);
        match warehouse.fetch_all(variant.template, &bound) {
            Ok(rows) => {
                tracing::debug!(
                    intent = %variant.intent,
                    variant = variant.name,
                    ordinal = variant.ordinal,
                    rows = rows.len(),
                    "query variant succeeded"
                );
                return Resolution::Resolved { variant, rows };
            }
            Err(error) => {
                tracing::debug!(
                    intent = %variant.intent,
                    variant = variant.name,
                    ordinal = variant.ordinal,
                    error = %error,
                    "query variant failed, trying next"
                );
                last = Some((variant, error));
            }
        }
    }

    match last {
        Some((variant, error)) => {
            tracing::warn!(
                intent = %variant.intent,
                variant = variant.name,
                attempts,
                error = %error,
                "every query variant failed"
            );
            Resolution::Exhausted {
                variant,
                attempts,
                error,
            }
        }
        None => Resolution::NoVariants,
    }
}

/// Resolves intents against a warehouse using a variant registry.
#[derive(Debug, Clone)]
pub struct QueryEngine<W> {
    warehouse: W,
    registry: VariantRegistry,
}

impl<W: Warehouse> QueryEngine<W> {
    pub fn new(warehouse: W, registry: VariantRegistry) -> Self {
        Self {
            warehouse,
            registry,
        }
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    pub fn resolve(&self, intent: QueryIntent, params: &QueryParams) -> Resolution<'_> {
        let variants = self.registry.variants_for(intent);
        try_variants(&self.warehouse, &variants, params)
    }

    /// Resolve and return raw rows.
    pub fn execute_rows(
        &self,
        intent: QueryIntent,
        params: &QueryParams,
    ) -> ResolutionResult<Vec<Row>> {
        self.resolve(intent, params).into_result(intent)
    }

    /// Resolve and decode every row as `T`.
    ///
    /// A decode failure is reported against the winning variant; it does not
    /// trigger a retry with the next one.
    pub fn execute<T: FromRow>(
        &self,
        intent: QueryIntent,
        params: &QueryParams,
    ) -> ResolutionResult<Vec<T>> {
        let resolution = self.resolve(intent, params);
        let Some(variant) = resolution.winner() else {
            return resolution.into_result(intent).map(|_| Vec::new());
        };
        let name = variant.name;

        resolution
            .into_result(intent)?
            .iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| ResolutionError::Decode {
                intent,
                variant: name,
                source,
            })
    }
}

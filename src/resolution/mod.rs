//! Query resolution across schema generations.
//!
//! The warehouse has been deployed with several table layouts. A report is
//! expressed as a [`QueryIntent`] with one [`QueryVariant`] per layout; the
//! engine tries them in ordinal order and returns the first that executes.
//!
//! ```text
//! intent ──▶ registry.variants_for(intent) ──▶ [#1, #2, #3, ...]
//!                                                 │
//!                 ┌───────────────────────────────┘
//!                 ▼
//!          fetch_all(#n) ── ok ──▶ Resolved { variant, rows }
//!                 │
//!                err ──▶ next ordinal, or Exhausted { last, error }
//! ```

mod engine;
mod registry;
mod variant;

pub use engine::{try_variants, QueryEngine, Resolution, ResolutionError, ResolutionResult};
pub use registry::{placeholders, VariantIssue, VariantRegistry};
pub use variant::{QueryIntent, QueryVariant};

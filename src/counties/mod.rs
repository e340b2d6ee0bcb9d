//! Canonical county directory.
//!
//! Source feeds spell jurisdictions inconsistently ("Allegany",
//! "ALLEGANY COUNTY", `allegany_county`). Every spelling is reduced to a
//! [`NormalizationKey`]; all spellings sharing a key resolve to one
//! [`CountyRecord`].
//!
//! Under the default [`SuffixPolicy::StripBoth`] "Baltimore City" and
//! "Baltimore County" share a key and collapse into one record. That is
//! how the feeds have always been reconciled, and it is wrong for those two
//! jurisdictions; the directory logs a warning whenever it happens.
//! [`SuffixPolicy::KeepCity`] keeps them apart.

mod directory;
mod normalize;

pub use directory::{state_for, CountyDirectory, CountyRecord, SUGGESTION_THRESHOLD};
pub use normalize::{display_name, NormalizationKey, SuffixKind, SuffixPolicy};

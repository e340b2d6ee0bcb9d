//! The canonical county directory.

use std::collections::{HashMap, HashSet};

use rusqlite::{params, Connection};
use serde::Serialize;

use super::normalize::{display_name, NormalizationKey, SuffixKind, SuffixPolicy};
use crate::config::IngestSettings;
use crate::warehouse::{QueryParams, Warehouse, WarehouseResult};

/// Minimum Jaro-Winkler similarity for [`CountyDirectory::suggest`].
pub const SUGGESTION_THRESHOLD: f64 = 0.85;

/// Marker for the catch-all jurisdiction used by the enforcement feeds.
const OUTSIDE_MARYLAND: &str = "Outside of Maryland";

/// A deduplicated jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyRecord {
    pub canonical_id: i64,
    pub canonical_name: String,
    pub state: Option<String>,
}

/// State code assigned to a newly registered county.
pub fn state_for(name: &str) -> &'static str {
    if name.contains(OUTSIDE_MARYLAND) {
        "N/A"
    } else {
        "MD"
    }
}

/// Maps every observed raw spelling to one canonical county.
///
/// Records are created once per distinct [`NormalizationKey`] with the next
/// sequential id and never change afterwards.
#[derive(Debug, Clone)]
pub struct CountyDirectory {
    policy: SuffixPolicy,
    accepts_new: bool,
    records: Vec<CountyRecord>,
    by_key: HashMap<NormalizationKey, usize>,
    next_id: i64,
    reported_collapses: HashSet<String>,
}

impl Default for CountyDirectory {
    fn default() -> Self {
        Self::new(SuffixPolicy::default())
    }
}

impl CountyDirectory {
    /// An open directory: unseen names observed during ingestion are registered.
    pub fn new(policy: SuffixPolicy) -> Self {
        Self {
            policy,
            accepts_new: true,
            records: Vec::new(),
            by_key: HashMap::new(),
            next_id: 1,
            reported_collapses: HashSet::new(),
        }
    }

    /// A closed directory: [`observe`](Self::observe) only resolves.
    pub fn closed(policy: SuffixPolicy) -> Self {
        Self {
            accepts_new: false,
            ..Self::new(policy)
        }
    }

    /// Build from ingestion settings.
    ///
    /// Counties already in the warehouse are loaded first so they keep
    /// their ids; `known_counties` not found there get the next free ids.
    pub fn from_settings<W: Warehouse + ?Sized>(
        settings: &IngestSettings,
        warehouse: &W,
    ) -> WarehouseResult<Self> {
        let mut directory = if settings.register_new_counties {
            Self::new(settings.county_suffix_policy)
        } else {
            Self::closed(settings.county_suffix_policy)
        };
        let loaded = directory.load(warehouse)?;
        for name in &settings.known_counties {
            directory.register(name);
        }
        tracing::debug!(
            loaded,
            known = settings.known_counties.len(),
            total = directory.len(),
            "seeded county directory"
        );
        Ok(directory)
    }

    pub fn policy(&self) -> SuffixPolicy {
        self.policy
    }

    pub fn accepts_new(&self) -> bool {
        self.accepts_new
    }

    pub fn key(&self, raw: &str) -> Option<NormalizationKey> {
        NormalizationKey::new(raw, self.policy)
    }

    /// Look up the canonical county for a raw spelling.
    pub fn resolve(&self, raw: &str) -> Option<&CountyRecord> {
        let key = self.key(raw)?;
        self.by_key.get(&key).map(|&i| &self.records[i])
    }

    /// Return the record for `raw`, creating it if the key is new.
    ///
    /// Returns `None` only when `raw` has no usable text.
    pub fn register(&mut self, raw: &str) -> Option<&CountyRecord> {
        let key = self.key(raw)?;

        if let Some(&i) = self.by_key.get(&key) {
            self.report_collapse(raw, i);
            return Some(&self.records[i]);
        }

        let name = display_name(raw);
        let record = CountyRecord {
            canonical_id: self.next_id,
            state: Some(state_for(&name).to_string()),
            canonical_name: name,
        };
        tracing::debug!(
            id = record.canonical_id,
            name = %record.canonical_name,
            key = %key,
            "registered county"
        );
        self.next_id += 1;
        self.records.push(record);
        self.by_key.insert(key, self.records.len() - 1);
        self.records.last()
    }

    /// Register when the directory is open, otherwise just resolve.
    pub fn observe(&mut self, raw: &str) -> Option<&CountyRecord> {
        if self.accepts_new {
            self.register(raw)
        } else {
            self.resolve(raw)
        }
    }

    /// Closest known county by Jaro-Winkler similarity of the keys.
    ///
    /// Only used to make unresolved-name log lines actionable.
    pub fn suggest(&self, raw: &str) -> Option<&CountyRecord> {
        let key = self.key(raw)?;
        self.by_key
            .iter()
            .map(|(known, &i)| (strsim::jaro_winkler(key.as_str(), known.as_str()), i))
            .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, i)| &self.records[i])
    }

    pub fn records(&self) -> &[CountyRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Seed from the per-source `counties` table so ids stay stable across runs.
    ///
    /// Rows whose id or lookup key is already present are skipped. Returns
    /// the number of records loaded.
    pub fn load<W: Warehouse + ?Sized>(&mut self, warehouse: &W) -> WarehouseResult<usize> {
        let rows = warehouse.fetch_all(
            "SELECT county_id, county_name, state FROM counties ORDER BY county_id",
            &QueryParams::new(),
        )?;

        let mut loaded = 0;
        for row in rows {
            let record = CountyRecord {
                canonical_id: row.integer("county_id")?,
                canonical_name: row.text("county_name")?,
                state: row.opt_text("state")?,
            };
            self.next_id = self.next_id.max(record.canonical_id + 1);

            if self
                .records
                .iter()
                .any(|r| r.canonical_id == record.canonical_id)
            {
                tracing::warn!(
                    id = record.canonical_id,
                    name = %record.canonical_name,
                    "county id already present in the directory; skipping warehouse row"
                );
                continue;
            }
            let Some(key) = self.key(&record.canonical_name) else {
                continue;
            };
            if let Some(&existing) = self.by_key.get(&key) {
                tracing::warn!(
                    id = record.canonical_id,
                    name = %record.canonical_name,
                    kept = %self.records[existing].canonical_name,
                    "warehouse holds two counties with the same lookup key; keeping the first"
                );
                continue;
            }
            self.records.push(record);
            self.by_key.insert(key, self.records.len() - 1);
            loaded += 1;
        }
        Ok(loaded)
    }

    /// Write every record, ignoring ids that already exist.
    ///
    /// Returns the number of rows inserted.
    pub fn persist(&self, conn: &Connection) -> WarehouseResult<usize> {
        let mut stmt = conn.prepare(
            "INSERT OR IGNORE INTO counties (county_id, county_name, state) VALUES (?, ?, ?)",
        )?;
        let mut inserted = 0;
        for record in &self.records {
            inserted += stmt.execute(params![
                record.canonical_id,
                record.canonical_name,
                record.state
            ])?;
        }
        Ok(inserted)
    }

    fn report_collapse(&mut self, raw: &str, existing: usize) {
        if self.policy != SuffixPolicy::StripBoth {
            return;
        }
        let canonical = &self.records[existing].canonical_name;
        let (Some(seen), Some(kept)) = (SuffixKind::of(raw), SuffixKind::of(canonical)) else {
            return;
        };
        if seen != kept && self.reported_collapses.insert(raw.trim().to_string()) {
            tracing::warn!(
                raw = %raw.trim(),
                canonical = %canonical,
                "county and city spellings collapsed onto one record; \
                 set ingest.county_suffix_policy = \"keep_city\" to keep them apart"
            );
        }
    }
}

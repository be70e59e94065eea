use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A `YYYY-MM-DD` date string used as the join key across both sources.
pub type DateKey = String;

// ── DateMap ───────────────────────────────────────────────────────────────────

/// Insertion-ordered map keyed by [`DateKey`].
///
/// Inserting an existing key replaces its value in place; the key keeps the
/// position of its first insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct DateMap<V> {
    entries: Vec<(DateKey, V)>,
    index: HashMap<DateKey, usize>,
}

impl<V> Default for DateMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> DateMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<DateKey>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Overwrite-merge every entry of `other` into `self`, in `other`'s order.
    pub fn absorb(&mut self, other: DateMap<V>) {
        for (key, value) in other {
            self.insert(key, value);
        }
    }
}

impl<V> IntoIterator for DateMap<V> {
    type Item = (DateKey, V);
    type IntoIter = std::vec::IntoIter<(DateKey, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K: Into<DateKey>, V> FromIterator<(K, V)> for DateMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = DateMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

/// Date → contribution count, as loaded from the structured files.
pub type ContributionMap = DateMap<u64>;

/// Date → intensity level, as loaded from the markup files.
pub type LevelMap = DateMap<u32>;

// ── Combined records ──────────────────────────────────────────────────────────

/// Per-date pairing of both sources. A field is `None` when its source had no
/// entry for the date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub contributions: Option<u64>,
    pub level: Option<u32>,
}

impl CombinedRecord {
    pub fn is_complete(&self) -> bool {
        self.contributions.is_some() && self.level.is_some()
    }

    /// Name of the first missing field, if any.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.contributions.is_none() {
            Some("contributions")
        } else if self.level.is_none() {
            Some("level")
        } else {
            None
        }
    }
}

/// Union of both sources keyed by date.
pub type CombinedRecords = DateMap<CombinedRecord>;

// ── Incomplete-record policy ──────────────────────────────────────────────────

/// How a reporter treats a [`CombinedRecord`] with a missing field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum IncompletePolicy {
    /// Leave the record out of the report.
    SkipRecord,
    /// Treat each missing field as `0`.
    DefaultZero,
    /// Fail the whole report on the first incomplete record.
    Abort,
}

impl std::fmt::Display for IncompletePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IncompletePolicy::SkipRecord => "skip-record",
            IncompletePolicy::DefaultZero => "default-zero",
            IncompletePolicy::Abort => "abort",
        };
        f.write_str(s)
    }
}

// ── Range summary ─────────────────────────────────────────────────────────────

/// Minimum and maximum contribution count observed for one level in one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelRange {
    pub level: u32,
    pub min: u64,
    pub max: u64,
}

/// Year → level ranges sorted ascending by level. Years iterate ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeSummary {
    years: BTreeMap<String, Vec<LevelRange>>,
}

impl RangeSummary {
    pub fn new(years: BTreeMap<String, Vec<LevelRange>>) -> Self {
        Self { years }
    }

    pub fn get(&self, year: &str) -> Option<&[LevelRange]> {
        self.years.get(year).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[LevelRange])> {
        self.years.iter().map(|(y, r)| (y.as_str(), r.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Number of years in the summary.
    pub fn len(&self) -> usize {
        self.years.len()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

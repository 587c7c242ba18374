//! # Document Store
//!
//! The remote database behind the student directory is abstracted as a
//! [`DocumentStore`]: named collections of flat field maps, addressed by
//! collection + id, with ordered (and optionally range-bounded) queries on a
//! single field.
//!
//! ## Server Timestamps
//!
//! Clients never stamp documents with their own clock. A write carries
//! [`FieldValue::ServerTimestamp`] placeholders and the store replaces them
//! with its clock when it applies the write:
//! - every placeholder in one write resolves to the same instant, so a new
//!   document gets `createdAt == updatedAt`;
//! - the store clock never repeats or runs backwards, so successive writes to
//!   one document get strictly increasing stamps.
//!
//! ## Range Queries
//!
//! [`StringRange`] is a half-open `[start, end)` bound on a string field.
//! Prefix search is `[prefix, prefix + sentinel)`, where the sentinel is
//! whatever the back-end guarantees to sort after all valid input
//! ([`DocumentStore::range_sentinel`]).
//!
//! ## Implementations
//!
//! - [`memory::MemoryDocumentStore`]: in-process store with fault injection,
//!   used by tests.
//! - [`fs::FileDocumentStore`]: one JSON file per collection, used by the CLI.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

pub mod fs;
pub mod memory;

/// Opaque document identifier, assigned by the store on `add`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh id for a store-assigned document.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    String(String),
    Timestamp(DateTime<Utc>),
    /// Write-only placeholder, replaced by the store clock on apply.
    ServerTimestamp,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Stores order mixed types as null < timestamp < string.
    fn type_rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Timestamp(_) | FieldValue::ServerTimestamp => 1,
            FieldValue::String(_) => 2,
        }
    }

    fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::String(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::String(s)
    }
}

/// Optional strings map `None` to `Null`.
impl From<Option<String>> for FieldValue {
    fn from(s: Option<String>) -> Self {
        s.map(FieldValue::String).unwrap_or(FieldValue::Null)
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: Fields,
}

impl Document {
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(FieldValue::as_str)
    }

    pub fn get_timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.get(field).and_then(FieldValue::as_timestamp)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Half-open `[start, end)` bound over a string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringRange {
    pub start: String,
    pub end: String,
}

impl StringRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Every string starting with `prefix`, given a sentinel that sorts after
    /// any character valid input can contain.
    pub fn prefix(prefix: &str, sentinel: char) -> Self {
        Self {
            start: prefix.to_string(),
            end: format!("{}{}", prefix, sentinel),
        }
    }

    pub fn contains(&self, value: &str) -> bool {
        value >= self.start.as_str() && value < self.end.as_str()
    }
}

/// Ordered scan of one collection.
///
/// Documents lacking the order-by field are not returned. With a range set,
/// only documents whose order-by field is a string inside the range are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub order_by: String,
    pub direction: Direction,
    pub range: Option<StringRange>,
}

impl Query {
    pub fn order_by(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            order_by: field.into(),
            direction,
            range: None,
        }
    }

    pub fn with_range(mut self, range: StringRange) -> Self {
        self.range = Some(range);
        self
    }

    fn matches(&self, doc: &Document) -> bool {
        match (doc.get(&self.order_by), &self.range) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(value), Some(range)) => value.as_str().is_some_and(|s| range.contains(s)),
        }
    }

    /// Filters and sorts documents given in insertion order. The sort is
    /// stable, so equal keys keep insertion order in both directions.
    pub fn apply(&self, docs: Vec<Document>) -> Vec<Document> {
        let mut selected: Vec<Document> = docs.into_iter().filter(|d| self.matches(d)).collect();
        selected.sort_by(|a, b| {
            let (Some(va), Some(vb)) = (a.get(&self.order_by), b.get(&self.order_by)) else {
                return Ordering::Equal;
            };
            match self.direction {
                Direction::Ascending => va.compare(vb),
                Direction::Descending => vb.compare(va),
            }
        });
        selected
    }
}

/// Abstract interface to the remote document store.
///
/// Every call is attempted exactly once; implementations do not retry.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Create a document with a store-assigned id.
    async fn add(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError>;

    /// Create or fully replace the document at `id`.
    async fn set(&self, collection: &str, id: &DocumentId, fields: Fields)
        -> Result<(), StoreError>;

    /// Merge `fields` into an existing document. Fails with `NotFound` when
    /// the document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError>;

    /// Remove a document. Removing a missing document succeeds.
    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError>;

    async fn get(&self, collection: &str, id: &DocumentId)
        -> Result<Option<Document>, StoreError>;

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// A character that sorts after every character valid input can contain.
    fn range_sentinel(&self) -> char {
        char::MAX
    }
}

/// Store-side clock. Successive ticks are strictly increasing even when the
/// wall clock stalls or steps back.
#[derive(Debug, Default)]
pub struct ServerClock {
    last: Mutex<Option<DateTime<Utc>>>,
}

impl ServerClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&self) -> DateTime<Utc> {
        self.tick_after(None)
    }

    /// A tick that is also later than `floor`, the newest instant already
    /// stored on the document being written.
    pub fn tick_after(&self, floor: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let mut last = self.last.lock();
        let mut now = Utc::now();
        for prev in [*last, floor].into_iter().flatten() {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

/// Newest timestamp value among `fields`.
pub fn latest_timestamp(fields: &Fields) -> Option<DateTime<Utc>> {
    fields.values().filter_map(FieldValue::as_timestamp).max()
}

/// Replaces every server-timestamp placeholder with `now`.
pub fn resolve_server_timestamps(fields: Fields, now: DateTime<Utc>) -> Fields {
    fields
        .into_iter()
        .map(|(k, v)| match v {
            FieldValue::ServerTimestamp => (k, FieldValue::Timestamp(now)),
            other => (k, other),
        })
        .collect()
}

/// Builds a field map from `(name, value)` pairs.
pub fn fields<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FieldValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, nama: &str) -> Document {
        Document {
            id: id.into(),
            fields: fields([("nama", nama)]),
        }
    }

    #[test]
    fn prefix_range_is_half_open() {
        let range = StringRange::prefix("Ad", char::MAX);
        assert!(range.contains("Ad"));
        assert!(range.contains("Adi"));
        assert!(range.contains("Adinda"));
        assert!(!range.contains("adi"));
        assert!(!range.contains("Budi"));
        assert!(!range.contains("Ac"));
        assert!(!range.contains(&range.end));
    }

    #[test]
    fn query_keeps_insertion_order_for_ties() {
        let docs = vec![doc("1", "Sari"), doc("2", "Adi"), doc("3", "Sari")];
        let asc = Query::order_by("nama", Direction::Ascending).apply(docs.clone());
        let ids: Vec<_> = asc.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);

        let desc = Query::order_by("nama", Direction::Descending).apply(docs);
        let ids: Vec<_> = desc.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3", "2"]);
    }

    #[test]
    fn query_skips_documents_without_order_field() {
        let docs = vec![
            doc("1", "Adi"),
            Document {
                id: "2".into(),
                fields: Fields::new(),
            },
        ];
        let out = Query::order_by("nama", Direction::Ascending).apply(docs);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn server_clock_ticks_past_floor() {
        let clock = ServerClock::new();
        let ahead = Utc::now() + Duration::hours(1);
        let tick = clock.tick_after(Some(ahead));
        assert!(tick > ahead);
        assert!(clock.tick() > tick);
    }

    #[test]
    fn server_clock_is_strictly_increasing() {
        let clock = ServerClock::new();
        let mut prev = clock.tick();
        for _ in 0..1000 {
            let next = clock.tick();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn placeholders_resolve_to_one_instant() {
        let now = Utc::now();
        let resolved = resolve_server_timestamps(
            Fields::from([
                ("createdAt".to_string(), FieldValue::ServerTimestamp),
                ("updatedAt".to_string(), FieldValue::ServerTimestamp),
                ("nama".to_string(), FieldValue::from("Adi")),
            ]),
            now,
        );
        assert_eq!(resolved["createdAt"], FieldValue::Timestamp(now));
        assert_eq!(resolved["updatedAt"], FieldValue::Timestamp(now));
        assert_eq!(resolved["nama"], FieldValue::from("Adi"));
    }
}

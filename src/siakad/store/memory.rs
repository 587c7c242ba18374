use super::{
    latest_timestamp, resolve_server_timestamps, Document, DocumentId, DocumentStore, Fields,
    Query, ServerClock,
};
use crate::error::StoreError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone)]
struct StoredDoc {
    seq: u64,
    fields: Fields,
}

#[derive(Default)]
struct Collections {
    docs: HashMap<String, HashMap<DocumentId, StoredDoc>>,
    next_seq: u64,
}

impl Collections {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// In-memory document store for tests.
///
/// Counts every call and can be switched into a failing state to exercise
/// error paths.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: Mutex<Collections>,
    clock: ServerClock,
    failure: Mutex<Option<StoreError>>,
    calls: AtomicUsize,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every call fails with a clone of `failure`.
    pub fn set_failure(&self, failure: Option<StoreError>) {
        *self.failure.lock() = failure;
    }

    /// Number of calls made against the store, failed ones included.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .docs
            .get(collection)
            .map_or(0, HashMap::len)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().as_ref() {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        self.enter()?;
        let id = DocumentId::generate();
        let fields = resolve_server_timestamps(fields, self.clock.tick());
        let mut collections = self.collections.lock();
        let seq = collections.next_seq();
        collections
            .docs
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), StoredDoc { seq, fields });
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.enter()?;
        let mut collections = self.collections.lock();
        let existing = collections
            .docs
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|d| (d.seq, latest_timestamp(&d.fields)));
        let (seq, floor) = match existing {
            Some(found) => found,
            None => (collections.next_seq(), None),
        };
        let fields = resolve_server_timestamps(fields, self.clock.tick_after(floor));
        collections
            .docs
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), StoredDoc { seq, fields });
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        self.enter()?;
        let mut collections = self.collections.lock();
        let doc = collections
            .docs
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let now = self.clock.tick_after(latest_timestamp(&doc.fields));
        doc.fields.extend(resolve_server_timestamps(fields, now));
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        self.enter()?;
        let mut collections = self.collections.lock();
        if let Some(c) = collections.docs.get_mut(collection) {
            c.remove(id);
        }
        Ok(())
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        self.enter()?;
        let collections = self.collections.lock();
        Ok(collections
            .docs
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|d| Document {
                id: id.clone(),
                fields: d.fields.clone(),
            }))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        self.enter()?;
        let mut stored: Vec<(u64, Document)> = {
            let collections = self.collections.lock();
            collections
                .docs
                .get(collection)
                .map(|c| {
                    c.iter()
                        .map(|(id, d)| {
                            (
                                d.seq,
                                Document {
                                    id: id.clone(),
                                    fields: d.fields.clone(),
                                },
                            )
                        })
                        .collect()
                })
                .unwrap_or_default()
        };
        stored.sort_by_key(|(seq, _)| *seq);
        Ok(query.apply(stored.into_iter().map(|(_, d)| d).collect()))
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::directory::DirectoryRepository;
    use crate::model::{Program, StudentInput};

    /// A repository over a fresh in-memory store.
    pub struct DirectoryFixture {
        pub repo: DirectoryRepository<MemoryDocumentStore>,
    }

    impl Default for DirectoryFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl DirectoryFixture {
        pub fn new() -> Self {
            Self {
                repo: DirectoryRepository::new(MemoryDocumentStore::new()),
            }
        }

        pub fn store(&self) -> &MemoryDocumentStore {
            self.repo.store()
        }

        /// Adds one student per name, in order, with generated NIMs.
        pub async fn with_students(self, names: &[&str]) -> Self {
            for (i, nama) in names.iter().enumerate() {
                let input = StudentInput::new(
                    format!("2024{:04}", i + 1),
                    *nama,
                    Program::TeknikInformatika.as_str(),
                );
                self.repo
                    .create(&input)
                    .await
                    .expect("fixture insert into memory store");
            }
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{fields, Direction, FieldValue};

    #[tokio::test]
    async fn add_assigns_id_and_resolves_timestamps() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add(
                "students",
                Fields::from([
                    ("nama".to_string(), FieldValue::from("Adi")),
                    ("createdAt".to_string(), FieldValue::ServerTimestamp),
                ]),
            )
            .await
            .unwrap();

        let doc = store.get("students", &id).await.unwrap().unwrap();
        assert!(doc.get_timestamp("createdAt").is_some());
        assert_eq!(doc.get_str("nama"), Some("Adi"));
        assert_eq!(store.len("students"), 1);
    }

    #[tokio::test]
    async fn update_missing_document_is_not_found() {
        let store = MemoryDocumentStore::new();
        let err = store
            .update("students", &"nope".into(), fields([("nama", "X")]))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryDocumentStore::new();
        let id = store
            .add("students", fields([("nama", "Adi"), ("nim", "1")]))
            .await
            .unwrap();
        store
            .update("students", &id, fields([("nim", "2")]))
            .await
            .unwrap();
        let doc = store.get("students", &id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("nama"), Some("Adi"));
        assert_eq!(doc.get_str("nim"), Some("2"));
    }

    #[tokio::test]
    async fn set_keeps_position_of_existing_document() {
        let store = MemoryDocumentStore::new();
        let first = store.add("c", fields([("k", "a")])).await.unwrap();
        store.add("c", fields([("k", "a")])).await.unwrap();
        store.set("c", &first, fields([("k", "a")])).await.unwrap();

        let out = store
            .query("c", &Query::order_by("k", Direction::Ascending))
            .await
            .unwrap();
        assert_eq!(out[0].id, first);
    }

    #[tokio::test]
    async fn injected_failure_is_returned_and_counted() {
        let store = MemoryDocumentStore::new();
        store.set_failure(Some(StoreError::permission("rules")));
        let err = store.delete("students", &"x".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::Permission { .. }));
        assert_eq!(store.call_count(), 1);

        store.set_failure(None);
        assert!(store.delete("students", &"x".into()).await.is_ok());
        assert_eq!(store.call_count(), 2);
    }
}

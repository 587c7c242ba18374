use super::{
    latest_timestamp, resolve_server_timestamps, Document, DocumentId, DocumentStore, Fields,
    Query, ServerClock,
};
use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CollectionFile {
    next_seq: u64,
    documents: BTreeMap<DocumentId, StoredDoc>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredDoc {
    seq: u64,
    fields: Fields,
}

/// File-backed document store: `<root>/<collection>.json` per collection.
///
/// Each write rewrites the collection file through a temp file and a rename,
/// so a write either lands whole or not at all.
pub struct FileDocumentStore {
    root: PathBuf,
    clock: ServerClock,
    lock: Mutex<()>,
}

impl FileDocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            clock: ServerClock::new(),
            lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{}.json", collection))
    }

    async fn load(&self, collection: &str) -> Result<CollectionFile, StoreError> {
        let path = self.collection_path(collection);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CollectionFile::default())
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content)
            .map_err(|e| StoreError::corrupt(path.display().to_string(), e.to_string()))
    }

    async fn save(&self, collection: &str, data: &CollectionFile) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root).await?;
        let path = self.collection_path(collection);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::corrupt(path.display().to_string(), e.to_string()))?;
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn add(&self, collection: &str, fields: Fields) -> Result<DocumentId, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.load(collection).await?;
        let id = DocumentId::generate();
        data.next_seq += 1;
        let stored = StoredDoc {
            seq: data.next_seq,
            fields: resolve_server_timestamps(fields, self.clock.tick()),
        };
        data.documents.insert(id.clone(), stored);
        self.save(collection, &data).await?;
        Ok(id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.load(collection).await?;
        let (seq, floor) = match data.documents.get(id) {
            Some(existing) => (existing.seq, latest_timestamp(&existing.fields)),
            None => {
                data.next_seq += 1;
                (data.next_seq, None)
            }
        };
        let fields = resolve_server_timestamps(fields, self.clock.tick_after(floor));
        data.documents.insert(id.clone(), StoredDoc { seq, fields });
        self.save(collection, &data).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &DocumentId,
        fields: Fields,
    ) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.load(collection).await?;
        let doc = data
            .documents
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let now = self.clock.tick_after(latest_timestamp(&doc.fields));
        doc.fields.extend(resolve_server_timestamps(fields, now));
        self.save(collection, &data).await
    }

    async fn delete(&self, collection: &str, id: &DocumentId) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.load(collection).await?;
        if data.documents.remove(id).is_none() {
            return Ok(());
        }
        self.save(collection, &data).await
    }

    async fn get(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let _guard = self.lock.lock().await;
        let mut data = self.load(collection).await?;
        Ok(data.documents.remove(id).map(|d| Document {
            id: id.clone(),
            fields: d.fields,
        }))
    }

    async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, StoreError> {
        let _guard = self.lock.lock().await;
        let data = self.load(collection).await?;
        let mut stored: Vec<(DocumentId, StoredDoc)> = data.documents.into_iter().collect();
        stored.sort_by_key(|(_, d)| d.seq);
        let docs = stored
            .into_iter()
            .map(|(id, d)| Document {
                id,
                fields: d.fields,
            })
            .collect();
        Ok(query.apply(docs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{fields, Direction, FieldValue};
    use tempfile::TempDir;

    #[tokio::test]
    async fn documents_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = FileDocumentStore::new(dir.path());
            store
                .add("students", fields([("nama", "Adi")]))
                .await
                .unwrap()
        };

        let reopened = FileDocumentStore::new(dir.path());
        let doc = reopened.get("students", &id).await.unwrap().unwrap();
        assert_eq!(doc.get_str("nama"), Some("Adi"));
    }

    #[tokio::test]
    async fn update_after_reopen_stays_after_stored_stamps() {
        let dir = TempDir::new().unwrap();
        let ahead = chrono::Utc::now() + chrono::Duration::hours(1);
        let id: DocumentId = "adi".into();
        FileDocumentStore::new(dir.path())
            .set(
                "students",
                &id,
                Fields::from([
                    ("nama".to_string(), FieldValue::from("Adi")),
                    ("createdAt".to_string(), FieldValue::Timestamp(ahead)),
                    ("updatedAt".to_string(), FieldValue::Timestamp(ahead)),
                ]),
            )
            .await
            .unwrap();

        let reopened = FileDocumentStore::new(dir.path());
        reopened
            .update(
                "students",
                &id,
                Fields::from([("updatedAt".to_string(), FieldValue::ServerTimestamp)]),
            )
            .await
            .unwrap();

        let doc = reopened.get("students", &id).await.unwrap().unwrap();
        let created = doc.get_timestamp("createdAt").unwrap();
        let updated = doc.get_timestamp("updatedAt").unwrap();
        assert!(updated > ahead);
        assert!(created <= updated);
    }

    #[tokio::test]
    async fn missing_collection_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path().join("not-yet"));
        let out = store
            .query("students", &Query::order_by("nama", Direction::Ascending))
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(store.get("students", &"x".into()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn writes_leave_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path());
        let id = store.add("students", fields([("nama", "A")])).await.unwrap();
        store
            .update("students", &id, fields([("nama", "B")]))
            .await
            .unwrap();
        store.delete("students", &id).await.unwrap();

        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let name = entry.unwrap().file_name().into_string().unwrap();
            assert!(!name.ends_with(".tmp"), "Found leftover tmp file: {}", name);
        }
    }

    #[tokio::test]
    async fn corrupt_collection_file_is_reported() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("students.json"), "{ not json").unwrap();
        let store = FileDocumentStore::new(dir.path());
        let err = store.get("students", &"x".into()).await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn timestamps_round_trip_through_json() {
        let dir = TempDir::new().unwrap();
        let store = FileDocumentStore::new(dir.path());
        let id = store
            .add(
                "students",
                Fields::from([("createdAt".to_string(), FieldValue::ServerTimestamp)]),
            )
            .await
            .unwrap();
        let first = store.get("students", &id).await.unwrap().unwrap();
        let again = FileDocumentStore::new(dir.path())
            .get("students", &id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.get_timestamp("createdAt"), again.get_timestamp("createdAt"));
    }
}

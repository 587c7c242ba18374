use super::codec::{encode_patch, UPDATED_AT};
use super::STUDENTS;
use crate::error::StoreError;
use crate::model::StudentPatch;
use crate::store::{DocumentId, DocumentStore, FieldValue};
use tracing::{debug, info};

pub(super) async fn run<S: DocumentStore>(
    store: &S,
    id: &DocumentId,
    patch: &StudentPatch,
) -> Result<(), StoreError> {
    if patch.is_empty() {
        debug!(%id, "empty patch, touching updatedAt only");
    }
    let mut fields = encode_patch(patch);
    fields.insert(UPDATED_AT.to_string(), FieldValue::ServerTimestamp);

    store.update(STUDENTS, id, fields).await?;
    info!(%id, "student updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::directory::DirectoryRepository;
    use crate::error::StoreError;
    use crate::model::{StudentInput, StudentPatch};
    use crate::store::memory::MemoryDocumentStore;

    #[tokio::test]
    async fn update_merges_and_bumps_updated_at() {
        let repo = DirectoryRepository::new(MemoryDocumentStore::new());
        let input = StudentInput::new("2021001", "Adi", "Sistem Informasi").with_email("adi@kampus.ac.id");
        let id = repo.create(&input).await.unwrap();
        let created = repo.get(&id).await.unwrap();

        let patch = StudentPatch {
            alamat: Some("Jl. Asia Afrika 8".into()),
            ..Default::default()
        };
        repo.update(&id, &patch).await.unwrap();
        let first = repo.get(&id).await.unwrap();

        repo.update(&id, &patch).await.unwrap();
        let second = repo.get(&id).await.unwrap();

        assert_eq!(first.created_at, created.created_at);
        assert!(first.updated_at > created.updated_at);
        assert!(second.updated_at > first.updated_at);
        assert_eq!(second.alamat.as_deref(), Some("Jl. Asia Afrika 8"));
        assert_eq!(second.nama, "Adi");
        assert_eq!(second.email.as_deref(), Some("adi@kampus.ac.id"));
        assert!(second.created_at <= second.updated_at);
    }

    #[tokio::test]
    async fn empty_optional_clears_field() {
        let repo = DirectoryRepository::new(MemoryDocumentStore::new());
        let id = repo
            .create(&StudentInput::new("1", "Adi", "Ilmu Komputer").with_telepon("0812"))
            .await
            .unwrap();

        let patch = StudentPatch {
            telepon: Some(String::new()),
            ..Default::default()
        };
        repo.update(&id, &patch).await.unwrap();
        assert_eq!(repo.get(&id).await.unwrap().telepon, None);
    }

    #[tokio::test]
    async fn updating_missing_id_is_not_found() {
        let repo = DirectoryRepository::new(MemoryDocumentStore::new());
        let err = repo
            .update(&"missing".into(), &StudentPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("students", "missing"));
    }
}

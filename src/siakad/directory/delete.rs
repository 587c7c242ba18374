use super::STUDENTS;
use crate::error::StoreError;
use crate::store::{DocumentId, DocumentStore};
use tracing::info;

/// Missing documents count as deleted; the store cannot tell them apart.
pub(super) async fn run<S: DocumentStore>(store: &S, id: &DocumentId) -> Result<(), StoreError> {
    store.delete(STUDENTS, id).await?;
    info!(%id, "student deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::store::memory::fixtures::DirectoryFixture;

    #[tokio::test]
    async fn delete_is_idempotent() {
        let fixture = DirectoryFixture::new().with_students(&["Adi", "Budi"]).await;
        let repo = &fixture.repo;
        let target = repo.list_all().await.unwrap()[0].id.clone();

        repo.delete(&target).await.unwrap();
        repo.delete(&target).await.unwrap();

        let remaining = repo.list_all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(remaining.iter().all(|r| r.id != target));
    }

    #[tokio::test]
    async fn deleting_unknown_id_succeeds() {
        let fixture = DirectoryFixture::new();
        assert!(fixture.repo.delete(&"never-existed".into()).await.is_ok());
    }
}

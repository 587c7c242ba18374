use super::codec::{decode, CREATED_AT};
use super::STUDENTS;
use crate::error::StoreError;
use crate::model::StudentRecord;
use crate::store::{Direction, DocumentStore, Query};
use tracing::debug;

pub(super) async fn run<S: DocumentStore>(store: &S) -> Result<Vec<StudentRecord>, StoreError> {
    let query = Query::order_by(CREATED_AT, Direction::Descending);
    let docs = store.query(STUDENTS, &query).await?;
    debug!(count = docs.len(), "students listed");
    docs.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use crate::error::StoreError;
    use crate::store::memory::fixtures::DirectoryFixture;

    #[tokio::test]
    async fn newest_first() {
        let fixture = DirectoryFixture::new()
            .with_students(&["Adi", "Budi", "Citra"])
            .await;
        let names: Vec<String> = fixture
            .repo
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.nama)
            .collect();
        assert_eq!(names, vec!["Citra", "Budi", "Adi"]);
    }

    #[tokio::test]
    async fn empty_directory_lists_nothing() {
        let fixture = DirectoryFixture::new();
        assert!(fixture.repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_is_reported_once() {
        let fixture = DirectoryFixture::new();
        fixture
            .store()
            .set_failure(Some(StoreError::transport("offline")));
        assert!(fixture.repo.list_all().await.is_err());
        assert_eq!(fixture.store().call_count(), 1);
    }
}

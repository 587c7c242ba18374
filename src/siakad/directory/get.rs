use super::codec::decode;
use super::STUDENTS;
use crate::error::StoreError;
use crate::model::StudentRecord;
use crate::store::{DocumentId, DocumentStore};

pub(super) async fn run<S: DocumentStore>(
    store: &S,
    id: &DocumentId,
) -> Result<StudentRecord, StoreError> {
    let doc = store
        .get(STUDENTS, id)
        .await?
        .ok_or_else(|| StoreError::not_found(STUDENTS, id))?;
    decode(doc)
}

use super::codec::{encode_input, CREATED_AT, UPDATED_AT};
use super::STUDENTS;
use crate::error::StoreError;
use crate::model::StudentInput;
use crate::store::{DocumentId, DocumentStore, FieldValue};
use tracing::info;

pub(super) async fn run<S: DocumentStore>(
    store: &S,
    input: &StudentInput,
) -> Result<DocumentId, StoreError> {
    let mut fields = encode_input(input);
    fields.insert(CREATED_AT.to_string(), FieldValue::ServerTimestamp);
    fields.insert(UPDATED_AT.to_string(), FieldValue::ServerTimestamp);

    let id = store.add(STUDENTS, fields).await?;
    info!(%id, nim = %input.nim, "student created");
    Ok(id)
}

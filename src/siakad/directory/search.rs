use super::codec::{decode, NAMA};
use super::STUDENTS;
use crate::error::StoreError;
use crate::model::StudentRecord;
use crate::store::{Direction, DocumentStore, Query, StringRange};
use tracing::debug;

pub(super) async fn run<S: DocumentStore>(
    store: &S,
    prefix: &str,
) -> Result<Vec<StudentRecord>, StoreError> {
    let mut query = Query::order_by(NAMA, Direction::Ascending);
    if !prefix.is_empty() {
        query = query.with_range(StringRange::prefix(prefix, store.range_sentinel()));
    }

    let docs = store.query(STUDENTS, &query).await?;
    debug!(prefix, count = docs.len(), "students searched");
    docs.into_iter().map(decode).collect()
}

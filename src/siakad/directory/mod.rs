//! # Student Directory
//!
//! [`DirectoryRepository`] is a stateless facade over the `students`
//! collection of a [`DocumentStore`]. It owns no local state and performs no
//! validation; callers validate first (see [`crate::validation`]).
//!
//! ## Operations
//!
//! | Operation | Store call | Notes |
//! |-----------|-----------|-------|
//! | `create` | `add` | `createdAt = updatedAt = server now`; `nim` is not deduplicated |
//! | `update` | `update` | merges supplied fields, bumps `updatedAt`; missing id is `NotFound` |
//! | `delete` | `delete` | idempotent |
//! | `get` | `get` | missing id is `NotFound` |
//! | `list_all` | `query` | `createdAt` descending, ties in insertion order |
//! | `search_by_name_prefix` | `query` | `nama` in `[prefix, prefix + sentinel)`, ascending |
//!
//! Each operation makes exactly one store call and never retries. Concurrent
//! updates to one id resolve last-write-wins per field.
//!
//! ## Search Semantics
//!
//! Prefix search is a range scan, so it is case-sensitive and prefix-only:
//! `"Ad"` finds `"Adi"` and `"Adinda"` but not `"adi"` or `"Nadia"`.

use crate::error::StoreError;
use crate::model::{StudentInput, StudentPatch, StudentRecord};
use crate::store::{DocumentId, DocumentStore};

mod codec;
mod create;
mod delete;
mod get;
mod list;
mod search;
mod update;
pub mod users;

pub const STUDENTS: &str = "students";

pub struct DirectoryRepository<S: DocumentStore> {
    store: S,
}

impl<S: DocumentStore> DirectoryRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create(&self, input: &StudentInput) -> Result<DocumentId, StoreError> {
        create::run(&self.store, input).await
    }

    pub async fn update(&self, id: &DocumentId, patch: &StudentPatch) -> Result<(), StoreError> {
        update::run(&self.store, id, patch).await
    }

    pub async fn delete(&self, id: &DocumentId) -> Result<(), StoreError> {
        delete::run(&self.store, id).await
    }

    pub async fn get(&self, id: &DocumentId) -> Result<StudentRecord, StoreError> {
        get::run(&self.store, id).await
    }

    pub async fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        list::run(&self.store).await
    }

    pub async fn search_by_name_prefix(
        &self,
        prefix: &str,
    ) -> Result<Vec<StudentRecord>, StoreError> {
        search::run(&self.store, prefix).await
    }
}

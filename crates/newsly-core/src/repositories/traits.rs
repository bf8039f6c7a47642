use std::collections::HashSet;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::errors::StoreError;
use crate::models::BookmarkRecord;

/// A live sequence: current state on subscribe, then a fresh snapshot after each relevant change.
pub type LiveStream<T> = BoxStream<'static, Result<T, StoreError>>;

/// Published after every committed insert or delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkChange {
    pub id: String,
}

#[async_trait]
pub trait BookmarkRepository: Clone + Send + Sync + 'static {
    /// Every bookmark, most recently saved first.
    async fn all(&self) -> Result<Vec<BookmarkRecord>, StoreError>;
    fn watch_all(&self) -> LiveStream<Vec<BookmarkRecord>>;

    async fn find_by_id(&self, id: &str) -> Result<Option<BookmarkRecord>, StoreError>;
    async fn exists(&self, id: &str) -> Result<bool, StoreError>;
    fn watch_exists(&self, id: &str) -> LiveStream<bool>;

    /// Inserts or fully replaces the record with the same id.
    async fn upsert(&self, record: &BookmarkRecord) -> Result<(), StoreError>;
    /// Returns whether a row was removed. Absent ids are not an error.
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError>;

    async fn all_ids(&self) -> Result<HashSet<String>, StoreError>;
    async fn count(&self) -> Result<u64, StoreError>;
}

use super::traits::{BookmarkChange, BookmarkRepository, LiveStream};
use crate::errors::StoreError;
use crate::models::BookmarkRecord;
use crate::schema::bookmarks;
use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, instrument};

const CHANGE_BUFFER: usize = 64;

#[derive(Clone)]
pub struct SqliteBookmarkRepository {
    db: Arc<Mutex<SqliteConnection>>,
    changes: broadcast::Sender<BookmarkChange>,
}

impl SqliteBookmarkRepository {
    pub fn new(db: Arc<Mutex<SqliteConnection>>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self { db, changes }
    }

    /// Raw change notifications, one per committed insert or delete.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<BookmarkChange> {
        self.changes.subscribe()
    }

    // Runs a query off the async executor; clones share one connection.
    async fn run<T, F>(&self, query: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> QueryResult<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || -> Result<T, StoreError> {
            let mut conn = db.lock().map_err(|_| StoreError::LockPoisoned)?;
            Ok(query(&mut *conn)?)
        })
        .await?
    }
}

// Must run inside the write closure: a committed row is announced even if the
// caller's future is dropped.
fn publish(changes: &broadcast::Sender<BookmarkChange>, id: &str) {
    // No receivers is fine: nobody is watching.
    let _ = changes.send(BookmarkChange { id: id.to_string() });
}

/// Waits for the next change relevant to `id` (or any change when `None`).
/// Returns false once the channel is closed.
async fn next_change(changes: &mut broadcast::Receiver<BookmarkChange>, id: Option<&str>) -> bool {
    loop {
        match changes.recv().await {
            Ok(change) => match id {
                Some(id) if id != change.id => continue,
                _ => return true,
            },
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Bookmark watcher lagged, re-reading snapshot");
                return true;
            }
            Err(RecvError::Closed) => return false,
        }
    }
}

#[async_trait]
impl BookmarkRepository for SqliteBookmarkRepository {
    async fn all(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        self.run(|conn| {
            bookmarks::table
                .order((bookmarks::saved_at.desc(), bookmarks::id.asc()))
                .select(BookmarkRecord::as_select())
                .load(conn)
        })
        .await
    }

    fn watch_all(&self) -> LiveStream<Vec<BookmarkRecord>> {
        // Subscribe before the first read so no change slips in between.
        let changes = self.changes.subscribe();
        stream::unfold(
            (self.clone(), changes, true),
            |(repo, mut changes, first)| async move {
                if !first && !next_change(&mut changes, None).await {
                    return None;
                }
                let snapshot = repo.all().await;
                Some((snapshot, (repo, changes, false)))
            },
        )
        .boxed()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BookmarkRecord>, StoreError> {
        let id = id.to_string();
        self.run(move |conn| {
            bookmarks::table
                .find(id)
                .select(BookmarkRecord::as_select())
                .first(conn)
                .optional()
        })
        .await
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let id = id.to_string();
        self.run(move |conn| diesel::select(exists(bookmarks::table.find(id))).get_result(conn))
            .await
    }

    fn watch_exists(&self, id: &str) -> LiveStream<bool> {
        let changes = self.changes.subscribe();
        stream::unfold(
            (self.clone(), changes, id.to_string(), true),
            |(repo, mut changes, id, first)| async move {
                if !first && !next_change(&mut changes, Some(&id)).await {
                    return None;
                }
                let exists = repo.exists(&id).await;
                Some((exists, (repo, changes, id, false)))
            },
        )
        .boxed()
    }

    #[instrument(skip_all, fields(id = %record.id))]
    async fn upsert(&self, record: &BookmarkRecord) -> Result<(), StoreError> {
        let row = record.clone();
        let changes = self.changes.clone();
        self.run(move |conn| {
            diesel::replace_into(bookmarks::table)
                .values(&row)
                .execute(conn)?;
            publish(&changes, &row.id);
            Ok(())
        })
        .await?;

        debug!("Stored bookmark");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        let key = id.to_string();
        let changes = self.changes.clone();
        let removed = self
            .run(move |conn| {
                let removed = diesel::delete(bookmarks::table.find(key.as_str())).execute(conn)? > 0;
                if removed {
                    publish(&changes, &key);
                }
                Ok(removed)
            })
            .await?;

        if removed {
            debug!("Deleted bookmark");
        }
        Ok(removed)
    }

    async fn all_ids(&self) -> Result<HashSet<String>, StoreError> {
        let ids = self
            .run(|conn| bookmarks::table.select(bookmarks::id).load::<String>(conn))
            .await?;
        Ok(ids.into_iter().collect())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = self
            .run(|conn| bookmarks::table.count().get_result::<i64>(conn))
            .await?;
        Ok(count.max(0) as u64)
    }
}

use chrono::Utc;
use futures::StreamExt;
use tracing::{debug, info, instrument};

use crate::errors::StoreError;
use crate::models::Article;
use crate::repositories::{BookmarkRepository, LiveStream};

/// Owns every bookmark mutation and answers "is this article saved".
#[derive(Clone)]
pub struct Reconciler<R: BookmarkRepository> {
    repo: R,
}

impl<R: BookmarkRepository> Reconciler<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Stamps `is_bookmarked` on a batch from a single id-set snapshot.
    #[instrument(skip_all, fields(articles = articles.len()))]
    pub async fn mark_bookmark_status(
        &self,
        articles: Vec<Article>,
    ) -> Result<Vec<Article>, StoreError> {
        let saved = self.repo.all_ids().await?;

        let articles: Vec<Article> = articles
            .into_iter()
            .map(|mut article| {
                article.is_bookmarked = saved.contains(&article.id);
                article
            })
            .collect();

        debug!(
            bookmarked = articles.iter().filter(|a| a.is_bookmarked).count(),
            "Marked bookmark status"
        );
        Ok(articles)
    }

    /// Flips membership and returns the new state.
    ///
    /// Read-then-write with no lock between: concurrent toggles of the same
    /// article resolve last-writer-wins.
    #[instrument(skip_all, fields(id = %article.id))]
    pub async fn toggle(&self, article: &Article) -> Result<bool, StoreError> {
        let bookmarked = if self.repo.exists(&article.id).await? {
            self.repo.delete_by_id(&article.id).await?;
            false
        } else {
            self.repo
                .upsert(&article.to_bookmark(Utc::now().naive_utc()))
                .await?;
            true
        };

        info!(bookmarked, "Toggled bookmark");
        Ok(bookmarked)
    }

    pub async fn add(&self, article: &Article) -> Result<(), StoreError> {
        self.repo
            .upsert(&article.to_bookmark(Utc::now().naive_utc()))
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<bool, StoreError> {
        self.repo.delete_by_id(id).await
    }

    pub async fn is_bookmarked(&self, id: &str) -> Result<bool, StoreError> {
        self.repo.exists(id).await
    }

    pub fn watch_is_bookmarked(&self, id: &str) -> LiveStream<bool> {
        self.repo.watch_exists(id)
    }

    /// Saved articles, most recently saved first.
    pub async fn bookmarks(&self) -> Result<Vec<Article>, StoreError> {
        let records = self.repo.all().await?;
        Ok(records.into_iter().map(|r| r.into_article()).collect())
    }

    pub fn watch_bookmarks(&self) -> LiveStream<Vec<Article>> {
        self.repo
            .watch_all()
            .map(|snapshot| {
                snapshot.map(|records| records.into_iter().map(|r| r.into_article()).collect())
            })
            .boxed()
    }
}

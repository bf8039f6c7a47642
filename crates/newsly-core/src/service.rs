use std::sync::Arc;

use futures::StreamExt;
use futures::stream::BoxStream;
use tracing::{debug, info, instrument, warn};

use crate::errors::NewsError;
use crate::feed::{NewsFeed, NewsResponse, normalize_articles};
use crate::models::Article;
use crate::reconcile::Reconciler;
use crate::repositories::BookmarkRepository;

/// Live sequence surfaced to callers of [`NewsService`].
pub type NewsStream<T> = BoxStream<'static, Result<T, NewsError>>;

/// Entry point for readers of the feed and the bookmark list.
pub struct NewsService<F: NewsFeed, R: BookmarkRepository> {
    feed: Arc<F>,
    reconciler: Reconciler<R>,
}

impl<F: NewsFeed, R: BookmarkRepository> Clone for NewsService<F, R> {
    fn clone(&self) -> Self {
        Self {
            feed: Arc::clone(&self.feed),
            reconciler: self.reconciler.clone(),
        }
    }
}

impl<F: NewsFeed, R: BookmarkRepository> NewsService<F, R> {
    pub fn new(feed: F, repo: R) -> Self {
        Self {
            feed: Arc::new(feed),
            reconciler: Reconciler::new(repo),
        }
    }

    pub fn reconciler(&self) -> &Reconciler<R> {
        &self.reconciler
    }

    #[instrument(skip_all)]
    pub async fn fetch_top_headlines(&self) -> Result<Vec<Article>, NewsError> {
        debug!("Fetching top headlines");
        let response = self.feed.top_headlines().await?;
        self.reconcile(response).await
    }

    /// Blank queries succeed with no results and never reach the feed.
    #[instrument(skip_all, fields(query = %query))]
    pub async fn search(&self, query: &str) -> Result<Vec<Article>, NewsError> {
        let query = query.trim();
        if query.is_empty() {
            debug!("Blank query, skipping feed");
            return Ok(Vec::new());
        }

        debug!("Searching feed");
        let response = self.feed.search(query).await?;
        self.reconcile(response).await
    }

    async fn reconcile(&self, response: NewsResponse) -> Result<Vec<Article>, NewsError> {
        if !response.is_ok() {
            warn!(
                status = %response.status,
                code = ?response.code,
                message = ?response.message,
                "Feed returned error status"
            );
            return Err(NewsError::Upstream {
                status: response.status,
                code: response.code,
                message: response.message,
            });
        }

        let articles = normalize_articles(&response.articles);
        let articles = self.reconciler.mark_bookmark_status(articles).await?;

        info!(
            total_results = response.total_results,
            returned = articles.len(),
            "Feed page reconciled"
        );
        Ok(articles)
    }

    pub async fn toggle_bookmark(&self, article: &Article) -> Result<bool, NewsError> {
        Ok(self.reconciler.toggle(article).await?)
    }

    pub async fn add_bookmark(&self, article: &Article) -> Result<(), NewsError> {
        Ok(self.reconciler.add(article).await?)
    }

    pub async fn remove_bookmark(&self, id: &str) -> Result<bool, NewsError> {
        Ok(self.reconciler.remove(id).await?)
    }

    pub async fn is_bookmarked(&self, id: &str) -> Result<bool, NewsError> {
        Ok(self.reconciler.is_bookmarked(id).await?)
    }

    pub fn watch_is_bookmarked(&self, id: &str) -> NewsStream<bool> {
        self.reconciler
            .watch_is_bookmarked(id)
            .map(|state| state.map_err(NewsError::from))
            .boxed()
    }

    pub async fn bookmarks(&self) -> Result<Vec<Article>, NewsError> {
        Ok(self.reconciler.bookmarks().await?)
    }

    pub fn watch_bookmarks(&self) -> NewsStream<Vec<Article>> {
        self.reconciler
            .watch_bookmarks()
            .map(|snapshot| snapshot.map_err(NewsError::from))
            .boxed()
    }
}

#![allow(dead_code)]

use async_trait::async_trait;
use newsly_core::errors::{FeedError, StoreError};
use newsly_core::feed::{NewsFeed, NewsResponse, RawArticle};
use newsly_core::models::BookmarkRecord;
use newsly_core::repositories::{BookmarkRepository, LiveStream};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub use newsly_core::test_helpers::{create_test_repository, fixtures, test_utils};

pub fn ok_response(articles: Vec<RawArticle>) -> NewsResponse {
    NewsResponse {
        status: "ok".to_string(),
        total_results: articles.len() as u32,
        articles,
        code: None,
        message: None,
    }
}

pub fn error_response(code: &str, message: &str) -> NewsResponse {
    NewsResponse {
        status: "error".to_string(),
        total_results: 0,
        articles: Vec::new(),
        code: Some(code.to_string()),
        message: Some(message.to_string()),
    }
}

/// A local address with nothing listening on it.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{port}/")
}

/// Produces a real connection-refused error from reqwest.
pub async fn offline_error() -> FeedError {
    let err = reqwest::get(unreachable_base_url())
        .await
        .expect_err("nothing should be listening");
    FeedError::from(err)
}

#[derive(Clone)]
enum Behavior {
    Respond(NewsResponse),
    Offline,
}

/// In-memory [`NewsFeed`] that records every call.
#[derive(Clone)]
pub struct FakeFeed {
    behavior: Arc<Mutex<Behavior>>,
    calls: Arc<AtomicUsize>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl FakeFeed {
    pub fn responding(response: NewsResponse) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(Behavior::Respond(response))),
            calls: Arc::new(AtomicUsize::new(0)),
            queries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_articles(articles: Vec<RawArticle>) -> Self {
        Self::responding(ok_response(articles))
    }

    pub fn offline() -> Self {
        let feed = Self::with_articles(Vec::new());
        *feed.behavior.lock().unwrap() = Behavior::Offline;
        feed
    }

    pub fn set_response(&self, response: NewsResponse) {
        *self.behavior.lock().unwrap() = Behavior::Respond(response);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }

    async fn respond(&self) -> Result<NewsResponse, FeedError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let behavior = self.behavior.lock().unwrap().clone();
        match behavior {
            Behavior::Respond(response) => Ok(response),
            Behavior::Offline => Err(offline_error().await),
        }
    }
}

#[async_trait]
impl NewsFeed for FakeFeed {
    async fn top_headlines(&self) -> Result<NewsResponse, FeedError> {
        self.respond().await
    }

    async fn search(&self, query: &str) -> Result<NewsResponse, FeedError> {
        self.queries.lock().unwrap().push(query.to_string());
        self.respond().await
    }
}

/// Wraps a repository and counts reads so tests can assert on access patterns.
#[derive(Clone)]
pub struct CountingRepository<R> {
    inner: R,
    all_ids_calls: Arc<AtomicUsize>,
    total_calls: Arc<AtomicUsize>,
}

impl<R: BookmarkRepository> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            all_ids_calls: Arc::new(AtomicUsize::new(0)),
            total_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn all_ids_calls(&self) -> usize {
        self.all_ids_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.total_calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.total_calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<R: BookmarkRepository> BookmarkRepository for CountingRepository<R> {
    async fn all(&self) -> Result<Vec<BookmarkRecord>, StoreError> {
        self.hit();
        self.inner.all().await
    }

    fn watch_all(&self) -> LiveStream<Vec<BookmarkRecord>> {
        self.hit();
        self.inner.watch_all()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<BookmarkRecord>, StoreError> {
        self.hit();
        self.inner.find_by_id(id).await
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        self.hit();
        self.inner.exists(id).await
    }

    fn watch_exists(&self, id: &str) -> LiveStream<bool> {
        self.hit();
        self.inner.watch_exists(id)
    }

    async fn upsert(&self, record: &BookmarkRecord) -> Result<(), StoreError> {
        self.hit();
        self.inner.upsert(record).await
    }

    async fn delete_by_id(&self, id: &str) -> Result<bool, StoreError> {
        self.hit();
        self.inner.delete_by_id(id).await
    }

    async fn all_ids(&self) -> Result<HashSet<String>, StoreError> {
        self.hit();
        self.all_ids_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.all_ids().await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.hit();
        self.inner.count().await
    }
}

use std::sync::{Arc, Mutex};

pub mod config;
pub mod db;
pub mod errors;
pub mod feed;
pub mod identity;
pub mod models;
pub mod reconcile;
pub mod repositories;
pub mod schema;
pub mod service;

#[cfg(feature = "test-helpers")]
pub mod test_helpers;

pub use config::NewsConfig;
pub use errors::{ConfigError, ErrorKind, FeedError, NewsError, StoreError};
pub use feed::{NewsApiClient, NewsFeed};
pub use identity::article_id;
pub use models::{Article, BookmarkRecord};
pub use reconcile::Reconciler;
pub use repositories::{BookmarkRepository, SqliteBookmarkRepository};
pub use service::{NewsService, NewsStream};

pub type DefaultNewsService = NewsService<NewsApiClient, SqliteBookmarkRepository>;

/// Wires the NewsAPI client and the SQLite bookmark store described by `config`.
pub fn create_service(config: &NewsConfig) -> Result<DefaultNewsService, NewsError> {
    let connection = db::establish_connection(&config.database_url)?;
    let repo = SqliteBookmarkRepository::new(Arc::new(Mutex::new(connection)));
    let feed = NewsApiClient::new(config)?;
    Ok(NewsService::new(feed, repo))
}

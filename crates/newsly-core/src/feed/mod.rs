pub mod client;
pub mod dto;
pub mod normalize;

pub use client::{NewsApiClient, NewsFeed};
pub use dto::{NewsResponse, RawArticle, RawSource};
pub use normalize::{dedup_by_id, normalize_article, normalize_articles};

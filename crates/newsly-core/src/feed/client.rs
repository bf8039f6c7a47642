use async_trait::async_trait;
use tracing::{debug, instrument};
use url::Url;

use super::dto::NewsResponse;
use crate::config::NewsConfig;
use crate::errors::FeedError;

const TOP_HEADLINES_PATH: &str = "v2/top-headlines";
const SEARCH_PATH: &str = "v2/everything";

/// Remote source of article pages.
#[async_trait]
pub trait NewsFeed: Send + Sync + 'static {
    async fn top_headlines(&self) -> Result<NewsResponse, FeedError>;
    async fn search(&self, query: &str) -> Result<NewsResponse, FeedError>;
}

/// [`NewsFeed`] backed by the NewsAPI.org HTTP endpoints.
#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    country: String,
    page_size: u32,
    sort_by: String,
}

impl NewsApiClient {
    pub fn new(config: &NewsConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("newsly/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FeedError::Client)?;

        Ok(Self {
            http,
            base_url: parse_base_url(&config.base_url)?,
            api_key: config.api_key.clone(),
            country: config.country.clone(),
            page_size: config.page_size,
            sort_by: config.sort_by.clone(),
        })
    }

    fn top_headlines_url(&self) -> Result<Url, FeedError> {
        let mut url = self.base_url.join(TOP_HEADLINES_PATH)?;
        url.query_pairs_mut()
            .append_pair("country", &self.country)
            .append_pair("apiKey", &self.api_key)
            .append_pair("pageSize", &self.page_size.to_string());
        Ok(url)
    }

    fn search_url(&self, query: &str) -> Result<Url, FeedError> {
        let mut url = self.base_url.join(SEARCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("apiKey", &self.api_key)
            .append_pair("pageSize", &self.page_size.to_string())
            .append_pair("sortBy", &self.sort_by);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<NewsResponse, FeedError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        // Error statuses still carry a JSON body with status/code/message.
        let body = response.json::<NewsResponse>().await?;
        debug!(
            http_status = status.as_u16(),
            feed_status = %body.status,
            articles = body.articles.len(),
            "Received feed response"
        );
        Ok(body)
    }
}

// Url::join drops the last path segment unless the base ends with '/'.
fn parse_base_url(base_url: &str) -> Result<Url, FeedError> {
    let url = if base_url.ends_with('/') {
        Url::parse(base_url)?
    } else {
        Url::parse(&format!("{base_url}/"))?
    };
    Ok(url)
}

#[async_trait]
impl NewsFeed for NewsApiClient {
    #[instrument(skip_all, fields(country = %self.country, page_size = self.page_size))]
    async fn top_headlines(&self) -> Result<NewsResponse, FeedError> {
        let url = self.top_headlines_url()?;
        self.get(url).await
    }

    #[instrument(skip_all, fields(query = %query, page_size = self.page_size))]
    async fn search(&self, query: &str) -> Result<NewsResponse, FeedError> {
        let url = self.search_url(query)?;
        self.get(url).await
    }
}

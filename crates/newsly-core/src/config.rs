use std::time::Duration;

use crate::errors::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/";
pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_SORT_BY: &str = "publishedAt";
pub const DEFAULT_DATABASE_URL: &str = "newsly.db";

/// Settings for the remote feed and the bookmark database.
#[derive(Debug, Clone, PartialEq)]
pub struct NewsConfig {
    pub api_key: String,
    pub base_url: String,
    /// ISO 3166-1 region for top headlines
    pub country: String,
    pub page_size: u32,
    /// relevancy, popularity or publishedAt
    pub sort_by: String,
    pub request_timeout: Duration,
    pub database_url: String,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            country: DEFAULT_COUNTRY.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sort_by: DEFAULT_SORT_BY.to_string(),
            request_timeout: Duration::from_secs(30),
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl NewsConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Reads `NEWS_API_KEY` (required) and the optional overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("NEWS_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("NEWS_API_KEY"))?;

        let mut config = Self::new(api_key);

        if let Some(base_url) = lookup("NEWS_API_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(country) = lookup("NEWS_COUNTRY") {
            config.country = country;
        }
        if let Some(page_size) = lookup("NEWS_PAGE_SIZE") {
            config.page_size = parse_positive("NEWS_PAGE_SIZE", &page_size)?;
        }
        if let Some(sort_by) = lookup("NEWS_SORT_BY") {
            config.sort_by = sort_by;
        }
        if let Some(timeout) = lookup("NEWS_REQUEST_TIMEOUT_SECS") {
            let secs = parse_positive("NEWS_REQUEST_TIMEOUT_SECS", &timeout)?;
            config.request_timeout = Duration::from_secs(u64::from(secs));
        }
        if let Some(database_url) = lookup("DATABASE_URL") {
            config.database_url = database_url;
        }

        Ok(config)
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}

use std::collections::HashSet;

use tracing::warn;

use super::dto::RawArticle;
use crate::identity::article_id;
use crate::models::Article;

/// Title the upstream feed substitutes for taken-down stories.
pub const REMOVED_TITLE: &str = "[Removed]";
pub const UNKNOWN_SOURCE: &str = "Unknown";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Converts one raw record into an [`Article`], or `None` if it must be skipped.
pub fn normalize_article(raw: &RawArticle) -> Option<Article> {
    let title = non_blank(raw.title.as_deref())?;
    let url = non_blank(raw.url.as_deref())?;

    if title == REMOVED_TITLE {
        return None;
    }

    let description = trimmed(raw.description.as_deref());
    let content = trimmed(raw.content.as_deref()).or_else(|| description.clone());

    Some(Article {
        id: article_id(url),
        title: title.trim().to_string(),
        description: description.unwrap_or_default(),
        content: content.unwrap_or_default(),
        author: trimmed(raw.author.as_deref()).unwrap_or_default(),
        source_name: trimmed(raw.source.as_ref().and_then(|s| s.name.as_deref()))
            .unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
        url: url.to_string(),
        image_url: non_blank(raw.url_to_image.as_deref()).map(str::to_string),
        published_at: raw.published_at.clone().unwrap_or_default(),
        is_bookmarked: false,
    })
}

/// Normalizes a feed page, silently dropping malformed or removed records.
pub fn normalize_articles(raw: &[RawArticle]) -> Vec<Article> {
    let articles: Vec<Article> = raw.iter().filter_map(normalize_article).collect();

    let dropped = raw.len() - articles.len();
    if dropped > 0 {
        warn!(dropped, kept = articles.len(), "Dropped malformed feed records");
    }

    articles
}

/// Keeps the first article for each id, preserving order.
pub fn dedup_by_id(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.id.clone()))
        .collect()
}

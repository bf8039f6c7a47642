use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// A normalized news story.
///
/// `id` is derived from `url` (see [`crate::identity::article_id`]). `is_bookmarked`
/// is a point-in-time projection of bookmark membership and is not part of identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub source_name: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: String,
    #[serde(default)]
    pub is_bookmarked: bool,
}

impl Article {
    /// Same story, regardless of fetch or bookmark state.
    pub fn same_story(&self, other: &Article) -> bool {
        self.id == other.id
    }

    /// Snapshot this article as a bookmark saved at `saved_at`.
    pub(crate) fn to_bookmark(&self, saved_at: NaiveDateTime) -> BookmarkRecord {
        BookmarkRecord {
            id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            content: self.content.clone(),
            author: self.author.clone(),
            source_name: self.source_name.clone(),
            url: self.url.clone(),
            image_url: self.image_url.clone(),
            published_at: self.published_at.clone(),
            saved_at,
        }
    }
}

/// A persisted bookmark. Membership in the table is the bookmarked flag.
#[derive(
    Debug, Clone, PartialEq, Eq, Queryable, Selectable, Insertable, Serialize, Deserialize,
)]
#[diesel(table_name = crate::schema::bookmarks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BookmarkRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: String,
    pub author: String,
    pub source_name: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: String,
    pub saved_at: NaiveDateTime,
}

impl BookmarkRecord {
    pub(crate) fn into_article(self) -> Article {
        Article {
            id: self.id,
            title: self.title,
            description: self.description,
            content: self.content,
            author: self.author,
            source_name: self.source_name,
            url: self.url,
            image_url: self.image_url,
            published_at: self.published_at,
            is_bookmarked: true,
        }
    }
}

use diesel::sqlite::SqliteConnection;
use std::sync::{Arc, Mutex};

use crate::db::establish_connection;
use crate::feed::{RawArticle, RawSource};
use crate::models::{Article, BookmarkRecord};
use crate::repositories::SqliteBookmarkRepository;

pub fn establish_test_connection() -> SqliteConnection {
    establish_connection(":memory:").expect("Failed to create in-memory database")
}

pub fn create_test_repository() -> (SqliteBookmarkRepository, Arc<Mutex<SqliteConnection>>) {
    let db = Arc::new(Mutex::new(establish_test_connection()));
    (SqliteBookmarkRepository::new(db.clone()), db)
}

pub mod fixtures {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    pub fn raw_article(title: &str, url: &str) -> RawArticle {
        RawArticle {
            source: Some(RawSource {
                id: None,
                name: Some("Test Source".to_string()),
            }),
            author: Some("Test Author".to_string()),
            title: Some(title.to_string()),
            description: Some(format!("About {title}")),
            url: Some(url.to_string()),
            url_to_image: None,
            published_at: Some("2024-12-15T10:00:00Z".to_string()),
            content: None,
        }
    }

    pub fn article(title: &str, url: &str) -> Article {
        crate::feed::normalize_article(&raw_article(title, url))
            .expect("fixture article should normalize")
    }

    /// 2024-12-15 at `hour`:`minute`.
    pub fn timestamp(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 12, 15)
            .and_then(|d| d.and_hms_opt(hour, minute, 0))
            .expect("valid fixture timestamp")
    }

    pub fn bookmark(title: &str, url: &str, saved_at: NaiveDateTime) -> BookmarkRecord {
        article(title, url).to_bookmark(saved_at)
    }
}

pub mod test_utils {
    use super::*;
    use crate::schema::bookmarks;
    use diesel::prelude::*;

    pub fn count_bookmarks(conn: &mut SqliteConnection) -> i64 {
        bookmarks::table
            .count()
            .get_result(conn)
            .expect("Failed to count bookmarks")
    }

    pub fn get_bookmark_by_id(conn: &mut SqliteConnection, id: &str) -> Option<BookmarkRecord> {
        bookmarks::table
            .find(id)
            .select(BookmarkRecord::as_select())
            .first(conn)
            .optional()
            .expect("Failed to query bookmark by id")
    }
}

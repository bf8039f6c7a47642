pub mod bookmarks;
pub mod traits;

pub use bookmarks::SqliteBookmarkRepository;
pub use traits::{BookmarkChange, BookmarkRepository, LiveStream};

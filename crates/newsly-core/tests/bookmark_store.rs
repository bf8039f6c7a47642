use anyhow::Result;
use futures::{FutureExt, StreamExt};
use newsly_core::repositories::BookmarkRepository;
use std::time::Duration;
use tokio::time::timeout;

mod common;

use common::fixtures::{bookmark, timestamp};
use common::{create_test_repository, test_utils};

const WAIT: Duration = Duration::from_secs(5);

#[tokio::test]
async fn test_empty_store() -> Result<()> {
    let (repo, _db) = create_test_repository();

    assert!(repo.all().await?.is_empty());
    assert!(repo.all_ids().await?.is_empty());
    assert_eq!(repo.count().await?, 0);
    assert!(!repo.exists("missing").await?);
    assert!(repo.find_by_id("missing").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_upsert_and_find() -> Result<()> {
    let (repo, db) = create_test_repository();
    let record = bookmark("Saved Story", "https://example.com/saved", timestamp(9, 0));

    repo.upsert(&record).await?;

    assert!(repo.exists(&record.id).await?);
    assert_eq!(repo.find_by_id(&record.id).await?, Some(record.clone()));

    // Verify database state
    {
        let mut conn = db.lock().unwrap();
        assert_eq!(test_utils::count_bookmarks(&mut conn), 1);
        let saved = test_utils::get_bookmark_by_id(&mut conn, &record.id)
            .expect("Bookmark should exist in database");
        assert_eq!(saved.url, "https://example.com/saved");
        assert_eq!(saved.source_name, "Test Source");
    }
    Ok(())
}

#[tokio::test]
async fn test_upsert_replaces_whole_record() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let original = bookmark("Original", "https://example.com/story", timestamp(9, 0));
    repo.upsert(&original).await?;

    let mut replacement = bookmark("Rewritten", "https://example.com/story", timestamp(11, 30));
    replacement.author = String::new();
    replacement.image_url = Some("https://example.com/new.jpg".to_string());
    repo.upsert(&replacement).await?;

    assert_eq!(repo.count().await?, 1);
    let stored = repo.find_by_id(&original.id).await?.expect("still stored");
    assert_eq!(stored, replacement);
    assert_eq!(stored.saved_at, timestamp(11, 30));
    Ok(())
}

#[tokio::test]
async fn test_all_orders_by_saved_at_descending() -> Result<()> {
    let (repo, _db) = create_test_repository();

    repo.upsert(&bookmark("Middle", "https://example.com/2", timestamp(10, 0)))
        .await?;
    repo.upsert(&bookmark("Oldest", "https://example.com/1", timestamp(8, 0)))
        .await?;
    repo.upsert(&bookmark("Newest", "https://example.com/3", timestamp(12, 0)))
        .await?;

    let titles: Vec<String> = repo.all().await?.into_iter().map(|r| r.title).collect();
    assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
    Ok(())
}

#[tokio::test]
async fn test_delete_by_id() -> Result<()> {
    let (repo, db) = create_test_repository();
    let record = bookmark("Doomed", "https://example.com/doomed", timestamp(9, 0));
    repo.upsert(&record).await?;

    assert!(repo.delete_by_id(&record.id).await?);
    assert!(!repo.exists(&record.id).await?);

    let mut conn = db.lock().unwrap();
    assert_eq!(test_utils::count_bookmarks(&mut conn), 0);
    Ok(())
}

#[tokio::test]
async fn test_delete_absent_is_noop() -> Result<()> {
    let (repo, _db) = create_test_repository();
    repo.upsert(&bookmark("Kept", "https://example.com/kept", timestamp(9, 0)))
        .await?;

    assert!(!repo.delete_by_id("not-there").await?);
    assert_eq!(repo.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_all_ids() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let a = bookmark("A", "https://example.com/a", timestamp(9, 0));
    let b = bookmark("B", "https://example.com/b", timestamp(9, 5));
    repo.upsert(&a).await?;
    repo.upsert(&b).await?;

    let ids = repo.all_ids().await?;
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&a.id));
    assert!(ids.contains(&b.id));
    Ok(())
}

#[tokio::test]
async fn test_clones_share_storage() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let other = repo.clone();
    let record = bookmark("Shared", "https://example.com/shared", timestamp(9, 0));

    other.upsert(&record).await?;

    assert!(repo.exists(&record.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_watch_all_emits_snapshot_on_subscribe_and_mutation() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let first = bookmark("First", "https://example.com/first", timestamp(9, 0));
    repo.upsert(&first).await?;

    let mut stream = repo.watch_all();

    let initial = timeout(WAIT, stream.next()).await?.expect("stream open")?;
    assert_eq!(initial, vec![first.clone()]);

    let second = bookmark("Second", "https://example.com/second", timestamp(10, 0));
    repo.upsert(&second).await?;
    let after_insert = timeout(WAIT, stream.next()).await?.expect("stream open")?;
    assert_eq!(after_insert, vec![second.clone(), first.clone()]);

    repo.delete_by_id(&second.id).await?;
    let after_delete = timeout(WAIT, stream.next()).await?.expect("stream open")?;
    assert_eq!(after_delete, vec![first]);
    Ok(())
}

#[tokio::test]
async fn test_abandoned_write_still_reaches_watchers() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let record = bookmark("Story", "https://example.com/story", timestamp(9, 0));

    let mut stream = repo.watch_all();
    let initial = timeout(WAIT, stream.next()).await?.expect("stream open")?;
    assert!(initial.is_empty());

    // Poll the write once, then drop it while the blocking query is in flight.
    let _ = repo.upsert(&record).now_or_never();

    let updated = timeout(WAIT, stream.next()).await?.expect("stream open")?;
    assert_eq!(updated, vec![record.clone()]);

    let mut exists = repo.watch_exists(&record.id);
    assert!(timeout(WAIT, exists.next()).await?.expect("stream open")?);

    let _ = repo.delete_by_id(&record.id).now_or_never();

    assert!(!timeout(WAIT, exists.next()).await?.expect("stream open")?);
    Ok(())
}

#[tokio::test]
async fn test_watch_all_is_restartable() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let record = bookmark("Story", "https://example.com/story", timestamp(9, 0));

    {
        let mut stream = repo.watch_all();
        let initial = timeout(WAIT, stream.next()).await?.expect("stream open")?;
        assert!(initial.is_empty());
    }

    repo.upsert(&record).await?;

    let mut stream = repo.watch_all();
    let initial = timeout(WAIT, stream.next()).await?.expect("stream open")?;
    assert_eq!(initial, vec![record]);
    Ok(())
}

#[tokio::test]
async fn test_watch_exists_tracks_one_id() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let watched = bookmark("Watched", "https://example.com/watched", timestamp(9, 0));
    let unrelated = bookmark("Unrelated", "https://example.com/unrelated", timestamp(9, 0));

    let mut stream = repo.watch_exists(&watched.id);
    assert!(!timeout(WAIT, stream.next()).await?.expect("stream open")?);

    // Changes to other ids are not emitted
    repo.upsert(&unrelated).await?;
    repo.upsert(&watched).await?;
    assert!(timeout(WAIT, stream.next()).await?.expect("stream open")?);

    repo.delete_by_id(&watched.id).await?;
    assert!(!timeout(WAIT, stream.next()).await?.expect("stream open")?);
    Ok(())
}

#[tokio::test]
async fn test_change_notifications() -> Result<()> {
    let (repo, _db) = create_test_repository();
    let mut changes = repo.subscribe_changes();
    let record = bookmark("Story", "https://example.com/story", timestamp(9, 0));

    repo.upsert(&record).await?;
    repo.delete_by_id("absent").await?;
    repo.delete_by_id(&record.id).await?;

    assert_eq!(changes.recv().await?.id, record.id);
    assert_eq!(changes.recv().await?.id, record.id);
    assert!(changes.try_recv().is_err());
    Ok(())
}

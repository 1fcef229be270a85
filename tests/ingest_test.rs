/// Ingest tests - profile and watch list reconciliation end to end
///
/// Tests run the ingest service against a real store and check the
/// resulting catalog, directory and list state plus the sync report.
mod utils;

use kiroku::{
    AnimeRepository, Archive, EntryFields, EntryKey, ListRepository, PageRequest, StoreError,
    SyncReport, UserRepository,
};
use utils::factories;

fn snapshot(anime_ids: &[i32]) -> Vec<(kiroku::AnimeRecord, EntryFields)> {
    anime_ids
        .iter()
        .map(|anime_id| {
            (
                factories::rated_anime(*anime_id, 70),
                factories::scored_entry(60 + *anime_id as i16),
            )
        })
        .collect()
}

#[tokio::test]
async fn first_sync_populates_catalog_and_list() {
    let archive = Archive::default();
    let ingest = archive.ingest();

    ingest.ingest_profile(factories::user(7)).await.unwrap();
    let report = ingest.sync_watch_list(7, snapshot(&[1, 2, 3])).await.unwrap();

    assert_eq!(
        report,
        SyncReport {
            anime_saved: 3,
            entries_upserted: 3,
            entries_removed: 0,
        }
    );
    assert_eq!(archive.catalog().count().await.unwrap(), 3);
    assert_eq!(archive.lists().count_for_user(7).await.unwrap(), 3);
    let entry = archive.lists().get(EntryKey::new(7, 2)).await.unwrap();
    assert_eq!(entry.score, Some(62));
}

#[tokio::test]
async fn resync_removes_stale_entries_but_keeps_catalog_records() {
    let archive = Archive::default();
    let ingest = archive.ingest();
    ingest.ingest_profile(factories::user(7)).await.unwrap();
    ingest.sync_watch_list(7, snapshot(&[1, 2, 3])).await.unwrap();

    // The next snapshot dropped 1 and 3 and picked up 4.
    let report = ingest.sync_watch_list(7, snapshot(&[2, 4])).await.unwrap();

    assert_eq!(
        report,
        SyncReport {
            anime_saved: 2,
            entries_upserted: 2,
            entries_removed: 2,
        }
    );
    let listed = archive.lists().list_for_user(7, PageRequest::first(10)).await.unwrap();
    let ids: Vec<i32> = listed.items.iter().map(|entry| entry.anime_id).collect();
    assert_eq!(ids, vec![2, 4]);

    // Dropped entries leave their canonical records behind.
    assert!(archive.catalog().get(1).await.is_ok());
    assert!(archive.catalog().get(3).await.is_ok());
}

#[tokio::test]
async fn resync_refreshes_entry_fields() {
    let archive = Archive::default();
    let ingest = archive.ingest();
    ingest.ingest_profile(factories::user(7)).await.unwrap();
    ingest.sync_watch_list(7, snapshot(&[1])).await.unwrap();

    let rewatch = vec![(
        factories::rated_anime(1, 75),
        EntryFields::new()
            .user_title("second run")
            .start_day(factories::day(2024, 5, 1))
            .score(99),
    )];
    ingest.sync_watch_list(7, rewatch).await.unwrap();

    let entry = archive.lists().get(EntryKey::new(7, 1)).await.unwrap();
    assert_eq!(entry.score, Some(99));
    assert_eq!(entry.user_title.as_deref(), Some("second run"));
    // The catalog record was refreshed too.
    assert_eq!(archive.catalog().get(1).await.unwrap().average, Some(75));
}

#[tokio::test]
async fn sync_for_unknown_user_fails_cleanly() {
    let archive = Archive::default();

    let err = archive.ingest().sync_watch_list(404, snapshot(&[1])).await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
    assert_eq!(archive.catalog().count().await.unwrap(), 0);
}

#[tokio::test]
async fn sync_walks_a_list_longer_than_its_scan_limit() {
    let archive = Archive::default();
    let ingest = archive.ingest().scan_limit(2);
    ingest.ingest_profile(factories::user(7)).await.unwrap();
    ingest.sync_watch_list(7, snapshot(&[1, 2, 3, 4, 5])).await.unwrap();

    // Everything stored is stale for the empty snapshot, across three
    // scan pages.
    let report = ingest.sync_watch_list(7, Vec::new()).await.unwrap();

    assert_eq!(report.entries_removed, 5);
    assert_eq!(archive.lists().count_for_user(7).await.unwrap(), 0);
}

#[tokio::test]
async fn profile_refresh_overwrites_the_stored_record() {
    let archive = Archive::default();
    let ingest = archive.ingest();
    ingest.ingest_profile(factories::user(7)).await.unwrap();

    let mut renamed = factories::user(7);
    renamed.name = "renamed".to_string();
    ingest.ingest_profile(renamed).await.unwrap();

    assert_eq!(archive.directory().get(7).await.unwrap().name, "renamed");
    assert_eq!(archive.directory().count().await.unwrap(), 1);
}

#[tokio::test]
async fn history_by_name_returns_hydrated_entries() {
    let archive = Archive::default();
    let ingest = archive.ingest();
    ingest.ingest_profile(factories::user(7)).await.unwrap();
    ingest.sync_watch_list(7, snapshot(&[3, 1, 2])).await.unwrap();

    let page = archive.history_by_name("user_7", PageRequest::first(10)).await.unwrap();

    assert_eq!(page.len(), 3);
    let ids: Vec<i32> = page.items.iter().map(|record| record.anime.anime_id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(page.items[0].anime.titles.preferred(), Some("English 1"));
    assert_eq!(page.items[0].entry.score, Some(61));

    assert!(matches!(
        archive.history_by_name("nobody", PageRequest::first(10)).await.unwrap_err(),
        StoreError::NotFound(_)
    ));
}

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::modules::catalog::domain::{AnimeId, AnimeRecord, AnimeRepository};
use crate::modules::directory::domain::{UserId, UserRecord, UserRepository};
use crate::modules::list::domain::{EntryFields, EntryKey, ListRepository};
use crate::shared::application::pagination::{PageRequest, DEFAULT_PAGE_LIMIT};
use crate::shared::errors::StoreResult;

/// Outcome of one watch list synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub anime_saved: usize,
    pub entries_upserted: usize,
    pub entries_removed: usize,
}

/// Reconciles externally fetched profiles and watch lists into the
/// store.
///
/// A snapshot is authoritative for its user: entries it no longer
/// carries are removed, everything it carries is upserted. The
/// reconciliation is a sequence of store operations, not one atomic
/// batch; each constituent operation keeps its own atomicity.
pub struct IngestService {
    anime: Arc<dyn AnimeRepository>,
    users: Arc<dyn UserRepository>,
    lists: Arc<dyn ListRepository>,
    scan_limit: usize,
}

impl IngestService {
    pub fn new(
        anime: Arc<dyn AnimeRepository>,
        users: Arc<dyn UserRepository>,
        lists: Arc<dyn ListRepository>,
    ) -> Self {
        Self {
            anime,
            users,
            lists,
            scan_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Page size used when walking the stored list during a sync.
    pub fn scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    /// Inserts or refreshes an account profile.
    pub async fn ingest_profile(&self, profile: UserRecord) -> StoreResult<UserRecord> {
        debug!("ingesting profile for user {}", profile.user_id);
        self.users.save(profile).await
    }

    /// Brings the stored list for `user_id` in line with `snapshot`.
    ///
    /// Stale entries go first, then canonical records, then the entries
    /// over them, so an entry is never written before its anime.
    pub async fn sync_watch_list(
        &self,
        user_id: UserId,
        snapshot: Vec<(AnimeRecord, EntryFields)>,
    ) -> StoreResult<SyncReport> {
        self.users.get(user_id).await?;

        let fresh: BTreeSet<AnimeId> =
            snapshot.iter().map(|(anime, _)| anime.anime_id).collect();

        let mut stale = Vec::new();
        let mut request = PageRequest::first(self.scan_limit);
        loop {
            let page = self.lists.list_for_user(user_id, request).await?;
            stale.extend(
                page.items
                    .iter()
                    .filter(|entry| !fresh.contains(&entry.anime_id))
                    .map(|entry| entry.key()),
            );
            match page.next_request(self.scan_limit) {
                Some(next) => request = next,
                None => break,
            }
        }
        for key in &stale {
            self.lists.remove(*key).await?;
        }

        let mut report = SyncReport {
            entries_removed: stale.len(),
            ..SyncReport::default()
        };
        for (anime, fields) in snapshot {
            let anime_id = anime.anime_id;
            self.anime.save(anime).await?;
            report.anime_saved += 1;
            self.lists
                .upsert(EntryKey::new(user_id, anime_id), fields)
                .await?;
            report.entries_upserted += 1;
        }

        info!(
            "synced watch list for user {}: {} anime saved, {} entries upserted, {} removed",
            user_id, report.anime_saved, report.entries_upserted, report.entries_removed
        );
        Ok(report)
    }
}

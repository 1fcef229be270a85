use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::Stream;
use log::debug;

use crate::modules::catalog::domain::AnimeId;
use crate::modules::directory::domain::UserId;
use crate::shared::application::pagination::{stream_pages, Page, PageRequest};
use crate::shared::config::StoreConfig;
use crate::shared::errors::{Entity, StoreError, StoreResult};
use crate::shared::infrastructure::memory::{AnimeTable, ListTable, UserTable};
use crate::shared::utils::Validator;

use super::super::domain::{
    entities::{EntryFields, EntryKey, ListEntry, WatchRecord},
    repository::ListRepository,
};

const STREAM_CHUNK: usize = 64;

/// In-memory engine behind [`ListRepository`].
///
/// Every cross-entity mutation serializes on the lists write lock, the
/// first lock in the crate-wide order. Holding it across the owner
/// checks and the write means a concurrent owner delete either ran
/// before us (we fail with a dangling reference) or runs after us (it
/// sees our entry and restricts or cascades). A dangling entry can
/// never be admitted.
pub struct ListStore {
    lists: Arc<ListTable>,
    anime: Arc<AnimeTable>,
    users: Arc<UserTable>,
    config: Arc<StoreConfig>,
}

impl ListStore {
    pub(crate) fn new(
        lists: Arc<ListTable>,
        anime: Arc<AnimeTable>,
        users: Arc<UserTable>,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            lists,
            anime,
            users,
            config,
        }
    }

    /// Streams one user's entries without holding a lock between
    /// chunks.
    pub fn stream_for_user(
        &self,
        user_id: UserId,
    ) -> impl Stream<Item = StoreResult<ListEntry>> + '_ {
        let chunk = self.config.max_page_size.min(STREAM_CHUNK);
        stream_pages(PageRequest::first(chunk), move |request| {
            self.list_for_user(user_id, request)
        })
    }

    /// Streams one title's entries in watcher order.
    pub fn stream_for_anime(
        &self,
        anime_id: AnimeId,
    ) -> impl Stream<Item = StoreResult<ListEntry>> + '_ {
        let chunk = self.config.max_page_size.min(STREAM_CHUNK);
        stream_pages(PageRequest::first(chunk), move |request| {
            self.list_for_anime(anime_id, request)
        })
    }

    // Anchor checks take their lock briefly and drop it, so the anime
    // and users locks are never held at the same time.
    async fn require_user(&self, user_id: UserId) -> StoreResult<()> {
        let users = self.users.rows.read().await;
        if users.contains_key(&user_id) {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::User, user_id))
        }
    }

    async fn require_anime(&self, anime_id: AnimeId) -> StoreResult<()> {
        let anime = self.anime.rows.read().await;
        if anime.contains_key(&anime_id) {
            Ok(())
        } else {
            Err(StoreError::not_found(Entity::Anime, anime_id))
        }
    }
}

#[async_trait]
impl ListRepository for ListStore {
    async fn upsert(&self, key: EntryKey, fields: EntryFields) -> StoreResult<ListEntry> {
        fields.validate(&self.config.score_bounds)?;

        // Lists lock first and held to the end: the owner checks and
        // the insert form one atomic step.
        let mut rows = self.lists.rows.write().await;
        {
            let anime = self.anime.rows.read().await;
            if !anime.contains_key(&key.anime_id) {
                return Err(StoreError::dangling(Entity::Anime, key.anime_id));
            }
        }
        {
            let users = self.users.rows.read().await;
            if !users.contains_key(&key.user_id) {
                return Err(StoreError::dangling(Entity::User, key.user_id));
            }
        }

        let replaced = rows.upsert(key, fields.clone());
        debug!(
            "{} entry {}",
            if replaced.is_some() { "replaced" } else { "inserted" },
            key
        );
        Ok(ListEntry::from_parts(key, fields))
    }

    async fn get(&self, key: EntryKey) -> StoreResult<ListEntry> {
        let rows = self.lists.rows.read().await;
        rows.get(&key)
            .cloned()
            .map(|fields| ListEntry::from_parts(key, fields))
            .ok_or_else(|| StoreError::not_found(Entity::ListEntry, key))
    }

    async fn remove(&self, key: EntryKey) -> StoreResult<()> {
        let mut rows = self.lists.rows.write().await;
        match rows.remove(&key) {
            Some(_) => {
                debug!("removed entry {}", key);
                Ok(())
            }
            None => Err(StoreError::not_found(Entity::ListEntry, key)),
        }
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest<AnimeId>,
    ) -> StoreResult<Page<ListEntry, AnimeId>> {
        Validator::validate_page_limit(page.limit, self.config.max_page_size)?;

        let rows = self.lists.rows.read().await;
        self.require_user(user_id).await?;

        let mut items = Vec::new();
        let mut truncated = false;
        for (key, fields) in rows.scan_user(user_id, page.after) {
            if items.len() == page.limit {
                truncated = true;
                break;
            }
            items.push(ListEntry::from_parts(*key, fields.clone()));
        }

        let next = if truncated {
            items.last().map(|entry| entry.anime_id)
        } else {
            None
        };
        Ok(Page::new(items, next))
    }

    async fn list_for_anime(
        &self,
        anime_id: AnimeId,
        page: PageRequest<UserId>,
    ) -> StoreResult<Page<ListEntry, UserId>> {
        Validator::validate_page_limit(page.limit, self.config.max_page_size)?;

        let rows = self.lists.rows.read().await;
        self.require_anime(anime_id).await?;

        let mut items = Vec::new();
        let mut truncated = false;
        for (key, fields) in rows.scan_anime(anime_id, page.after) {
            if items.len() == page.limit {
                truncated = true;
                break;
            }
            items.push(ListEntry::from_parts(key, fields.clone()));
        }

        let next = if truncated {
            items.last().map(|entry| entry.user_id)
        } else {
            None
        };
        Ok(Page::new(items, next))
    }

    async fn history_for_user(
        &self,
        user_id: UserId,
        page: PageRequest<AnimeId>,
    ) -> StoreResult<Page<WatchRecord, AnimeId>> {
        Validator::validate_page_limit(page.limit, self.config.max_page_size)?;

        let rows = self.lists.rows.read().await;
        self.require_user(user_id).await?;

        let mut entries = Vec::new();
        let mut truncated = false;
        for (key, fields) in rows.scan_user(user_id, page.after) {
            if entries.len() == page.limit {
                truncated = true;
                break;
            }
            entries.push(ListEntry::from_parts(*key, fields.clone()));
        }
        let next = if truncated {
            entries.last().map(|entry| entry.anime_id)
        } else {
            None
        };

        // Still under the lists lock, so every referenced record must
        // resolve: deletes take that lock before touching the catalog.
        let anime = self.anime.rows.read().await;
        let mut items = Vec::with_capacity(entries.len());
        for entry in entries {
            let record = anime
                .get(&entry.anime_id)
                .cloned()
                .ok_or_else(|| StoreError::dangling(Entity::Anime, entry.anime_id))?;
            items.push(WatchRecord {
                entry,
                anime: record,
            });
        }
        Ok(Page::new(items, next))
    }

    async fn count_for_user(&self, user_id: UserId) -> StoreResult<usize> {
        let rows = self.lists.rows.read().await;
        self.require_user(user_id).await?;
        Ok(rows.count_for_user(user_id))
    }

    async fn count_for_anime(&self, anime_id: AnimeId) -> StoreResult<usize> {
        let rows = self.lists.rows.read().await;
        self.require_anime(anime_id).await?;
        Ok(rows.count_for_anime(anime_id))
    }
}

use async_trait::async_trait;

use crate::modules::catalog::domain::AnimeId;
use crate::modules::directory::domain::UserId;
use crate::shared::application::pagination::{Page, PageRequest};
use crate::shared::errors::StoreResult;

use super::entities::{EntryFields, EntryKey, ListEntry, WatchRecord};

/// Contract of the list store component.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// Inserts or fully replaces the entry for a pair. Both referenced
    /// records must exist at the moment of the write.
    async fn upsert(&self, key: EntryKey, fields: EntryFields) -> StoreResult<ListEntry>;
    async fn get(&self, key: EntryKey) -> StoreResult<ListEntry>;
    async fn remove(&self, key: EntryKey) -> StoreResult<()>;
    async fn list_for_user(
        &self,
        user_id: UserId,
        page: PageRequest<AnimeId>,
    ) -> StoreResult<Page<ListEntry, AnimeId>>;
    async fn list_for_anime(
        &self,
        anime_id: AnimeId,
        page: PageRequest<UserId>,
    ) -> StoreResult<Page<ListEntry, UserId>>;
    /// Entries of one user joined with their catalog records.
    async fn history_for_user(
        &self,
        user_id: UserId,
        page: PageRequest<AnimeId>,
    ) -> StoreResult<Page<WatchRecord, AnimeId>>;
    async fn count_for_user(&self, user_id: UserId) -> StoreResult<usize>;
    async fn count_for_anime(&self, anime_id: AnimeId) -> StoreResult<usize>;
}

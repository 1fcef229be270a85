use async_trait::async_trait;

use crate::shared::application::pagination::{Page, PageRequest};
use crate::shared::errors::StoreResult;

use super::entities::{AnimeCursor, AnimeFilter, AnimeId, AnimePatch, AnimeRecord};

/// Contract of the anime catalog component.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AnimeRepository: Send + Sync {
    async fn create(&self, record: AnimeRecord) -> StoreResult<AnimeRecord>;
    async fn save(&self, record: AnimeRecord) -> StoreResult<AnimeRecord>;
    async fn get(&self, anime_id: AnimeId) -> StoreResult<AnimeRecord>;
    async fn update(&self, anime_id: AnimeId, patch: AnimePatch) -> StoreResult<AnimeRecord>;
    async fn delete(&self, anime_id: AnimeId) -> StoreResult<()>;
    async fn list(
        &self,
        filter: AnimeFilter,
        page: PageRequest<AnimeCursor>,
    ) -> StoreResult<Page<AnimeRecord, AnimeCursor>>;
    async fn count(&self) -> StoreResult<usize>;
}

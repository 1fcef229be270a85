use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::Stream;
use log::{debug, info};

use crate::shared::application::pagination::{stream_pages, Page, PageRequest};
use crate::shared::config::{CascadePolicy, StoreConfig};
use crate::shared::errors::{Entity, StoreError, StoreResult};
use crate::shared::infrastructure::memory::{AnimeTable, ListTable};
use crate::shared::utils::Validator;

use super::super::domain::{
    entities::{AnimeCursor, AnimeFilter, AnimeId, AnimePatch, AnimeRecord, AnimeSortKey},
    repository::AnimeRepository,
};

/// Chunk size used by the streaming walk.
const STREAM_CHUNK: usize = 64;

/// In-memory engine behind [`AnimeRepository`].
///
/// Shares the anime table with the list store and consults the list
/// table on delete. The lists lock is taken before the anime lock
/// there, so the dependents check and the removal form one atomic step
/// against concurrent entry upserts.
pub struct AnimeCatalog {
    table: Arc<AnimeTable>,
    lists: Arc<ListTable>,
    config: Arc<StoreConfig>,
}

impl AnimeCatalog {
    pub(crate) fn new(
        table: Arc<AnimeTable>,
        lists: Arc<ListTable>,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            table,
            lists,
            config,
        }
    }

    /// Streams every record matching `filter`, fetching lazily chunk by
    /// chunk. No lock is held between chunks, so dropping the stream
    /// cancels the walk.
    pub fn stream(&self, filter: AnimeFilter) -> impl Stream<Item = StoreResult<AnimeRecord>> + '_ {
        let chunk = self.config.max_page_size.min(STREAM_CHUNK);
        stream_pages(PageRequest::first(chunk), move |request| {
            let filter = filter.clone();
            async move { self.list(filter, request).await }
        })
    }

    fn cursor_mismatch() -> StoreError {
        StoreError::validation("Cursor does not match the requested sort order")
    }
}

/// Unrated records order after every rated one.
fn average_rank(average: Option<i16>) -> i32 {
    match average {
        Some(value) => i32::from(value),
        None => i32::from(i16::MAX) + 1,
    }
}

fn fill_page<'a, I>(records: I, limit: usize) -> (Vec<AnimeRecord>, bool)
where
    I: Iterator<Item = &'a AnimeRecord>,
{
    let mut items = Vec::new();
    for record in records {
        if items.len() == limit {
            return (items, true);
        }
        items.push(record.clone());
    }
    (items, false)
}

#[async_trait]
impl AnimeRepository for AnimeCatalog {
    async fn create(&self, record: AnimeRecord) -> StoreResult<AnimeRecord> {
        record.validate(&self.config.score_bounds)?;

        let mut rows = self.table.rows.write().await;
        if rows.contains_key(&record.anime_id) {
            return Err(StoreError::duplicate(Entity::Anime, record.anime_id));
        }
        rows.insert(record.anime_id, record.clone());
        debug!("created anime {}", record.anime_id);
        Ok(record)
    }

    async fn save(&self, record: AnimeRecord) -> StoreResult<AnimeRecord> {
        record.validate(&self.config.score_bounds)?;

        let mut rows = self.table.rows.write().await;
        let replaced = rows.insert(record.anime_id, record.clone());
        debug!(
            "saved anime {} ({})",
            record.anime_id,
            if replaced.is_some() { "replaced" } else { "inserted" }
        );
        Ok(record)
    }

    async fn get(&self, anime_id: AnimeId) -> StoreResult<AnimeRecord> {
        let rows = self.table.rows.read().await;
        rows.get(&anime_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::Anime, anime_id))
    }

    async fn update(&self, anime_id: AnimeId, patch: AnimePatch) -> StoreResult<AnimeRecord> {
        if let Some(requested) = patch.anime_id {
            if requested != anime_id {
                return Err(StoreError::immutable(Entity::Anime, "anime_id"));
            }
        }

        let mut rows = self.table.rows.write().await;
        let current = rows
            .get(&anime_id)
            .ok_or_else(|| StoreError::not_found(Entity::Anime, anime_id))?;

        // Applied to a copy and validated before the table is touched,
        // so a rejected patch leaves the record unchanged.
        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        updated.validate(&self.config.score_bounds)?;

        rows.insert(anime_id, updated.clone());
        debug!("updated anime {}", anime_id);
        Ok(updated)
    }

    async fn delete(&self, anime_id: AnimeId) -> StoreResult<()> {
        // Lists lock first, then our own table.
        let mut lists = self.lists.rows.write().await;
        let mut rows = self.table.rows.write().await;

        if !rows.contains_key(&anime_id) {
            return Err(StoreError::not_found(Entity::Anime, anime_id));
        }

        let dependents = lists.count_for_anime(anime_id);
        if dependents > 0 {
            match self.config.cascade {
                CascadePolicy::Restrict => {
                    return Err(StoreError::conflict(Entity::Anime, anime_id, dependents));
                }
                CascadePolicy::Cascade => {
                    let purged = lists.purge_anime(anime_id);
                    info!("cascade removed {} list entries for anime {}", purged, anime_id);
                }
            }
        }

        rows.remove(&anime_id);
        debug!("deleted anime {}", anime_id);
        Ok(())
    }

    async fn list(
        &self,
        filter: AnimeFilter,
        page: PageRequest<AnimeCursor>,
    ) -> StoreResult<Page<AnimeRecord, AnimeCursor>> {
        Validator::validate_page_limit(page.limit, self.config.max_page_size)?;

        let rows = self.table.rows.read().await;
        match filter.sort {
            AnimeSortKey::Id => {
                let low = match page.after {
                    None => Bound::Unbounded,
                    Some(AnimeCursor::Id(anime_id)) => Bound::Excluded(anime_id),
                    Some(AnimeCursor::Average(..)) => return Err(Self::cursor_mismatch()),
                };

                let matching = rows
                    .range((low, Bound::Unbounded))
                    .map(|(_, record)| record)
                    .filter(|record| filter.matches(record));
                let (items, truncated) = fill_page(matching, page.limit);

                let next = if truncated {
                    items.last().map(|record| AnimeCursor::Id(record.anime_id))
                } else {
                    None
                };
                Ok(Page::new(items, next))
            }
            AnimeSortKey::Average => {
                let position = match page.after {
                    None => None,
                    Some(AnimeCursor::Average(average, anime_id)) => {
                        Some((average_rank(average), anime_id))
                    }
                    Some(AnimeCursor::Id(_)) => return Err(Self::cursor_mismatch()),
                };

                let mut matching: Vec<&AnimeRecord> =
                    rows.values().filter(|record| filter.matches(record)).collect();
                matching.sort_by_key(|record| (average_rank(record.average), record.anime_id));

                let remaining = matching.into_iter().filter(|record| match position {
                    Some(position) => (average_rank(record.average), record.anime_id) > position,
                    None => true,
                });
                let (items, truncated) = fill_page(remaining, page.limit);

                let next = if truncated {
                    items
                        .last()
                        .map(|record| AnimeCursor::Average(record.average, record.anime_id))
                } else {
                    None
                };
                Ok(Page::new(items, next))
            }
        }
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.table.rows.read().await.len())
    }
}

use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::Stream;
use log::{debug, info};

use crate::shared::application::pagination::{stream_pages, Page, PageRequest};
use crate::shared::config::{CascadePolicy, StoreConfig};
use crate::shared::errors::{Entity, StoreError, StoreResult};
use crate::shared::infrastructure::memory::{ListTable, UserTable};
use crate::shared::utils::Validator;

use super::super::domain::{
    entities::{UserFilter, UserId, UserPatch, UserRecord},
    repository::UserRepository,
};

const STREAM_CHUNK: usize = 64;

/// In-memory engine behind [`UserRepository`].
///
/// Same shape as the catalog engine: delete takes the lists lock
/// before the users lock so the dependents check cannot race an entry
/// upsert.
pub struct UserDirectory {
    table: Arc<UserTable>,
    lists: Arc<ListTable>,
    config: Arc<StoreConfig>,
}

impl UserDirectory {
    pub(crate) fn new(
        table: Arc<UserTable>,
        lists: Arc<ListTable>,
        config: Arc<StoreConfig>,
    ) -> Self {
        Self {
            table,
            lists,
            config,
        }
    }

    /// Streams every profile matching `filter` without holding a lock
    /// between chunks.
    pub fn stream(&self, filter: UserFilter) -> impl Stream<Item = StoreResult<UserRecord>> + '_ {
        let chunk = self.config.max_page_size.min(STREAM_CHUNK);
        stream_pages(PageRequest::first(chunk), move |request| {
            let filter = filter.clone();
            async move { self.list(filter, request).await }
        })
    }
}

#[async_trait]
impl UserRepository for UserDirectory {
    async fn create(&self, record: UserRecord) -> StoreResult<UserRecord> {
        record.validate()?;

        let mut rows = self.table.rows.write().await;
        if rows.contains_key(&record.user_id) {
            return Err(StoreError::duplicate(Entity::User, record.user_id));
        }
        rows.insert(record.user_id, record.clone());
        debug!("created user {}", record.user_id);
        Ok(record)
    }

    async fn save(&self, record: UserRecord) -> StoreResult<UserRecord> {
        record.validate()?;

        let mut rows = self.table.rows.write().await;
        let replaced = rows.insert(record.user_id, record.clone());
        debug!(
            "saved user {} ({})",
            record.user_id,
            if replaced.is_some() { "replaced" } else { "inserted" }
        );
        Ok(record)
    }

    async fn get(&self, user_id: UserId) -> StoreResult<UserRecord> {
        let rows = self.table.rows.read().await;
        rows.get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::User, user_id))
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<UserRecord> {
        let rows = self.table.rows.read().await;
        // Ascending id iteration, so the lowest id wins on duplicates.
        rows.values()
            .find(|record| record.name == name)
            .cloned()
            .ok_or_else(|| StoreError::not_found(Entity::User, name))
    }

    async fn update(&self, user_id: UserId, patch: UserPatch) -> StoreResult<UserRecord> {
        if let Some(requested) = patch.user_id {
            if requested != user_id {
                return Err(StoreError::immutable(Entity::User, "user_id"));
            }
        }

        let mut rows = self.table.rows.write().await;
        let current = rows
            .get(&user_id)
            .ok_or_else(|| StoreError::not_found(Entity::User, user_id))?;

        let mut updated = current.clone();
        patch.apply_to(&mut updated);
        updated.validate()?;

        rows.insert(user_id, updated.clone());
        debug!("updated user {}", user_id);
        Ok(updated)
    }

    async fn delete(&self, user_id: UserId) -> StoreResult<()> {
        // Lists lock first, then our own table.
        let mut lists = self.lists.rows.write().await;
        let mut rows = self.table.rows.write().await;

        if !rows.contains_key(&user_id) {
            return Err(StoreError::not_found(Entity::User, user_id));
        }

        let dependents = lists.count_for_user(user_id);
        if dependents > 0 {
            match self.config.cascade {
                CascadePolicy::Restrict => {
                    return Err(StoreError::conflict(Entity::User, user_id, dependents));
                }
                CascadePolicy::Cascade => {
                    let purged = lists.purge_user(user_id);
                    info!("cascade removed {} list entries for user {}", purged, user_id);
                }
            }
        }

        rows.remove(&user_id);
        debug!("deleted user {}", user_id);
        Ok(())
    }

    async fn list(
        &self,
        filter: UserFilter,
        page: PageRequest<UserId>,
    ) -> StoreResult<Page<UserRecord, UserId>> {
        Validator::validate_page_limit(page.limit, self.config.max_page_size)?;

        let rows = self.table.rows.read().await;
        let low = match page.after {
            Some(user_id) => Bound::Excluded(user_id),
            None => Bound::Unbounded,
        };

        let mut items = Vec::new();
        let mut truncated = false;
        for (_, record) in rows.range((low, Bound::Unbounded)) {
            if !filter.matches(record) {
                continue;
            }
            if items.len() == page.limit {
                truncated = true;
                break;
            }
            items.push(record.clone());
        }

        let next = if truncated {
            items.last().map(|record| record.user_id)
        } else {
            None
        };
        Ok(Page::new(items, next))
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.table.rows.read().await.len())
    }
}

use async_trait::async_trait;

use crate::shared::application::pagination::{Page, PageRequest};
use crate::shared::errors::StoreResult;

use super::entities::{UserFilter, UserId, UserPatch, UserRecord};

/// Contract of the user directory component.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, record: UserRecord) -> StoreResult<UserRecord>;
    async fn save(&self, record: UserRecord) -> StoreResult<UserRecord>;
    async fn get(&self, user_id: UserId) -> StoreResult<UserRecord>;
    /// Exact-match lookup; with duplicate names the lowest id wins.
    async fn find_by_name(&self, name: &str) -> StoreResult<UserRecord>;
    async fn update(&self, user_id: UserId, patch: UserPatch) -> StoreResult<UserRecord>;
    async fn delete(&self, user_id: UserId) -> StoreResult<()>;
    async fn list(
        &self,
        filter: UserFilter,
        page: PageRequest<UserId>,
    ) -> StoreResult<Page<UserRecord, UserId>>;
    async fn count(&self) -> StoreResult<usize>;
}

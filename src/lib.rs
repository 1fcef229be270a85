//! Persistence core for an anime watch-list tracker.
//!
//! Three components share one in-memory store: the catalog holds
//! canonical anime records, the directory holds account profiles, and
//! the list store holds per-user watch entries referencing both.
//! Referential integrity between them is enforced here, in the access
//! layer, not deferred to an external database.
//!
//! ```
//! use kiroku::{
//!     AnimeRecord, AnimeRepository, Archive, EntryFields, EntryKey, ListRepository,
//!     UserRecord, UserRepository,
//! };
//!
//! # async fn demo() -> kiroku::StoreResult<()> {
//! let archive = Archive::default();
//!
//! let anime = AnimeRecord::new(1, "Space western", "s3://covers/1.jpg", "https://img/1.jpg");
//! archive.catalog().create(anime).await?;
//! archive
//!     .directory()
//!     .create(UserRecord::new(7, "shiro", "s3://avatars/7.png", "https://img/7.png"))
//!     .await?;
//!
//! let entry = archive
//!     .lists()
//!     .upsert(EntryKey::new(7, 1), EntryFields::new().score(92))
//!     .await?;
//! assert_eq!(entry.score, Some(92));
//! # Ok(())
//! # }
//! ```

pub mod modules;
pub mod shared;

use std::sync::Arc;

use shared::infrastructure::memory::{AnimeTable, ListTable, UserTable};

pub use modules::catalog::{
    AnimeCatalog, AnimeCursor, AnimeFilter, AnimeId, AnimePatch, AnimeRecord, AnimeRepository,
    AnimeSortKey, AnimeTitles,
};
pub use modules::directory::{
    UserDirectory, UserFilter, UserId, UserPatch, UserRecord, UserRepository,
};
pub use modules::ingest::{IngestService, SyncReport};
pub use modules::list::{
    date_from_parts, EntryFields, EntryKey, ListEntry, ListRepository, ListStore, WatchRecord,
};
pub use shared::application::pagination::{stream_pages, Page, PageRequest, DEFAULT_PAGE_LIMIT};
pub use shared::config::{CascadePolicy, ScoreBounds, StoreConfig, StoreConfigBuilder};
pub use shared::errors::{Entity, StoreError, StoreResult};
pub use shared::utils::init_logger;

/// The assembled store: three engines wired over shared tables.
///
/// Cheap to clone; clones share the same data.
#[derive(Clone)]
pub struct Archive {
    catalog: Arc<AnimeCatalog>,
    directory: Arc<UserDirectory>,
    lists: Arc<ListStore>,
}

impl Archive {
    /// Builds a store with the given configuration.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        Ok(Self::build(Arc::new(config)))
    }

    fn build(config: Arc<StoreConfig>) -> Self {
        let anime = Arc::new(AnimeTable::default());
        let users = Arc::new(UserTable::default());
        let lists = Arc::new(ListTable::default());

        Self {
            catalog: Arc::new(AnimeCatalog::new(
                anime.clone(),
                lists.clone(),
                config.clone(),
            )),
            directory: Arc::new(UserDirectory::new(
                users.clone(),
                lists.clone(),
                config.clone(),
            )),
            lists: Arc::new(ListStore::new(lists, anime, users, config)),
        }
    }

    pub fn catalog(&self) -> Arc<AnimeCatalog> {
        self.catalog.clone()
    }

    pub fn directory(&self) -> Arc<UserDirectory> {
        self.directory.clone()
    }

    pub fn lists(&self) -> Arc<ListStore> {
        self.lists.clone()
    }

    /// Ingest service wired over this store's components.
    pub fn ingest(&self) -> IngestService {
        IngestService::new(self.catalog(), self.directory(), self.lists())
    }

    /// History read anchored by display name, the way sync payloads
    /// refer to accounts.
    pub async fn history_by_name(
        &self,
        name: &str,
        page: PageRequest<AnimeId>,
    ) -> StoreResult<Page<WatchRecord, AnimeId>> {
        let user = self.directory.find_by_name(name).await?;
        self.lists.history_for_user(user.user_id, page).await
    }
}

impl Default for Archive {
    /// A store with the default configuration, which is always valid.
    fn default() -> Self {
        Self::build(Arc::new(StoreConfig::default()))
    }
}

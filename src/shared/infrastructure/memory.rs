/// In-memory backing tables shared by the store engines.
///
/// Lock order is fixed across the crate: lists before anime before
/// users, and the anime and users locks are never held at the same
/// time. Cross-entity mutations (entry upserts, owner deletes) take
/// the lists write lock first, which turns their existence check and
/// the write it guards into a single atomic step.
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use tokio::sync::RwLock;

use crate::modules::catalog::domain::{AnimeId, AnimeRecord};
use crate::modules::directory::domain::{UserId, UserRecord};
use crate::modules::list::domain::{EntryFields, EntryKey};

#[derive(Debug, Default)]
pub(crate) struct AnimeTable {
    pub(crate) rows: RwLock<BTreeMap<AnimeId, AnimeRecord>>,
}

#[derive(Debug, Default)]
pub(crate) struct UserTable {
    pub(crate) rows: RwLock<BTreeMap<UserId, UserRecord>>,
}

/// Entry rows plus the reverse index used to walk a title's watchers.
/// Both structures live under one lock and are only touched through
/// these methods, so they can never disagree.
#[derive(Debug, Default)]
pub(crate) struct ListRows {
    entries: BTreeMap<EntryKey, EntryFields>,
    by_anime: BTreeSet<(AnimeId, UserId)>,
}

impl ListRows {
    pub(crate) fn get(&self, key: &EntryKey) -> Option<&EntryFields> {
        self.entries.get(key)
    }

    /// Inserts or replaces an entry, returning the previous fields.
    pub(crate) fn upsert(&mut self, key: EntryKey, fields: EntryFields) -> Option<EntryFields> {
        self.by_anime.insert((key.anime_id, key.user_id));
        self.entries.insert(key, fields)
    }

    pub(crate) fn remove(&mut self, key: &EntryKey) -> Option<EntryFields> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.by_anime.remove(&(key.anime_id, key.user_id));
        }
        removed
    }

    /// Entries of one user ordered by anime id, strictly after `after`.
    pub(crate) fn scan_user(
        &self,
        user_id: UserId,
        after: Option<AnimeId>,
    ) -> impl Iterator<Item = (&EntryKey, &EntryFields)> + '_ {
        let low = match after {
            Some(anime_id) => Bound::Excluded(EntryKey { user_id, anime_id }),
            None => Bound::Included(EntryKey {
                user_id,
                anime_id: AnimeId::MIN,
            }),
        };
        let high = Bound::Included(EntryKey {
            user_id,
            anime_id: AnimeId::MAX,
        });
        self.entries.range((low, high))
    }

    /// Entries referencing one anime ordered by user id, strictly
    /// after `after`.
    pub(crate) fn scan_anime(
        &self,
        anime_id: AnimeId,
        after: Option<UserId>,
    ) -> impl Iterator<Item = (EntryKey, &EntryFields)> + '_ {
        let low = match after {
            Some(user_id) => Bound::Excluded((anime_id, user_id)),
            None => Bound::Included((anime_id, UserId::MIN)),
        };
        let high = Bound::Included((anime_id, UserId::MAX));
        self.by_anime.range((low, high)).filter_map(|(anime_id, user_id)| {
            let key = EntryKey::new(*user_id, *anime_id);
            self.entries.get(&key).map(|fields| (key, fields))
        })
    }

    pub(crate) fn count_for_user(&self, user_id: UserId) -> usize {
        self.scan_user(user_id, None).count()
    }

    pub(crate) fn count_for_anime(&self, anime_id: AnimeId) -> usize {
        self.scan_anime(anime_id, None).count()
    }

    /// Removes every entry of one user, returning how many went away.
    pub(crate) fn purge_user(&mut self, user_id: UserId) -> usize {
        let keys: Vec<EntryKey> = self.scan_user(user_id, None).map(|(key, _)| *key).collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }

    /// Removes every entry referencing one anime.
    pub(crate) fn purge_anime(&mut self, anime_id: AnimeId) -> usize {
        let keys: Vec<EntryKey> = self.scan_anime(anime_id, None).map(|(key, _)| key).collect();
        for key in &keys {
            self.remove(key);
        }
        keys.len()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListTable {
    pub(crate) rows: RwLock<ListRows>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(user_id: UserId, anime_id: AnimeId) -> EntryKey {
        EntryKey::new(user_id, anime_id)
    }

    fn seeded() -> ListRows {
        let mut rows = ListRows::default();
        rows.upsert(key(1, 10), EntryFields::new());
        rows.upsert(key(1, 20), EntryFields::new());
        rows.upsert(key(2, 10), EntryFields::new());
        rows.upsert(key(2, 30), EntryFields::new());
        rows
    }

    #[test]
    fn test_upsert_and_remove_keep_index_in_sync() {
        let mut rows = seeded();
        assert_eq!(rows.count_for_user(1) + rows.count_for_user(2), 4);
        assert_eq!(rows.count_for_anime(10), 2);

        rows.remove(&key(1, 10));
        assert_eq!(rows.count_for_anime(10), 1);
        assert!(rows.get(&key(1, 10)).is_none());

        // Replacing an existing entry does not duplicate index rows.
        rows.upsert(key(2, 10), EntryFields::new());
        assert_eq!(rows.count_for_anime(10), 1);
    }

    #[test]
    fn test_scan_user_is_ordered_and_resumable() {
        let rows = seeded();

        let all: Vec<AnimeId> = rows.scan_user(1, None).map(|(key, _)| key.anime_id).collect();
        assert_eq!(all, vec![10, 20]);

        let rest: Vec<AnimeId> = rows.scan_user(1, Some(10)).map(|(key, _)| key.anime_id).collect();
        assert_eq!(rest, vec![20]);
    }

    #[test]
    fn test_scan_anime_walks_watchers_in_user_order() {
        let rows = seeded();

        let watchers: Vec<UserId> = rows.scan_anime(10, None).map(|(key, _)| key.user_id).collect();
        assert_eq!(watchers, vec![1, 2]);

        let rest: Vec<UserId> = rows.scan_anime(10, Some(1)).map(|(key, _)| key.user_id).collect();
        assert_eq!(rest, vec![2]);
    }

    #[test]
    fn test_purges_touch_only_their_owner() {
        let mut rows = seeded();

        assert_eq!(rows.purge_user(1), 2);
        assert_eq!(rows.count_for_user(1), 0);
        assert_eq!(rows.count_for_user(2), 2);

        assert_eq!(rows.purge_anime(10), 1);
        assert_eq!(rows.count_for_user(2), 1);
        assert!(rows.get(&key(2, 30)).is_some());
    }
}

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::modules::catalog::domain::{AnimeId, AnimeRecord};
use crate::modules::directory::domain::UserId;
use crate::shared::config::ScoreBounds;
use crate::shared::errors::StoreResult;
use crate::shared::utils::Validator;

/// Composite identity of a list entry: at most one entry per
/// user/anime pair. Orders by user first, then anime, the order the
/// entry table is scanned in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntryKey {
    pub user_id: UserId,
    pub anime_id: AnimeId,
}

impl EntryKey {
    pub fn new(user_id: UserId, anime_id: AnimeId) -> Self {
        Self { user_id, anime_id }
    }
}

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user {} / anime {}", self.user_id, self.anime_id)
    }
}

/// The mutable payload of a list entry. An upsert replaces all of it,
/// so absent fields reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFields {
    /// Personal title override shown instead of the canonical titles.
    pub user_title: Option<String>,
    pub start_day: Option<NaiveDate>,
    pub end_day: Option<NaiveDate>,
    pub score: Option<i16>,
}

impl EntryFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_title(mut self, title: impl Into<String>) -> Self {
        self.user_title = Some(title.into());
        self
    }

    pub fn start_day(mut self, day: NaiveDate) -> Self {
        self.start_day = Some(day);
        self
    }

    pub fn end_day(mut self, day: NaiveDate) -> Self {
        self.end_day = Some(day);
        self
    }

    pub fn score(mut self, score: i16) -> Self {
        self.score = Some(score);
        self
    }

    pub fn validate(&self, bounds: &ScoreBounds) -> StoreResult<()> {
        Validator::validate_date_window(self.start_day, self.end_day)?;
        if let Some(score) = self.score {
            Validator::validate_score("score", score, bounds)?;
        }
        Ok(())
    }
}

/// A stored list entry: the key plus its current fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEntry {
    pub user_id: UserId,
    pub anime_id: AnimeId,
    pub user_title: Option<String>,
    pub start_day: Option<NaiveDate>,
    pub end_day: Option<NaiveDate>,
    pub score: Option<i16>,
}

impl ListEntry {
    pub(crate) fn from_parts(key: EntryKey, fields: EntryFields) -> Self {
        Self {
            user_id: key.user_id,
            anime_id: key.anime_id,
            user_title: fields.user_title,
            start_day: fields.start_day,
            end_day: fields.end_day,
            score: fields.score,
        }
    }

    pub fn key(&self) -> EntryKey {
        EntryKey::new(self.user_id, self.anime_id)
    }

    pub fn fields(&self) -> EntryFields {
        EntryFields {
            user_title: self.user_title.clone(),
            start_day: self.start_day,
            end_day: self.end_day,
            score: self.score,
        }
    }
}

/// One item of a hydrated history read: the entry joined with its
/// catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    pub entry: ListEntry,
    pub anime: AnimeRecord,
}

/// Builds a date from the split fields sync payloads carry. All three
/// parts must be present and name a real calendar day.
pub fn date_from_parts(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year?, month?, day?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_orders_by_user_then_anime() {
        let mut keys = vec![
            EntryKey::new(2, 1),
            EntryKey::new(1, 9),
            EntryKey::new(1, 3),
        ];
        keys.sort();

        assert_eq!(
            keys,
            vec![EntryKey::new(1, 3), EntryKey::new(1, 9), EntryKey::new(2, 1)]
        );
        assert_eq!(EntryKey::new(1, 3).to_string(), "user 1 / anime 3");
    }

    #[test]
    fn test_date_from_parts_requires_all_parts() {
        assert_eq!(
            date_from_parts(Some(2024), Some(3), Some(14)),
            NaiveDate::from_ymd_opt(2024, 3, 14)
        );
        assert!(date_from_parts(None, Some(3), Some(14)).is_none());
        assert!(date_from_parts(Some(2024), None, Some(14)).is_none());
        assert!(date_from_parts(Some(2024), Some(3), None).is_none());
        // Not a real calendar day.
        assert!(date_from_parts(Some(2024), Some(2), Some(30)).is_none());
    }

    #[test]
    fn test_fields_validation_checks_window_and_score() {
        let bounds = ScoreBounds::default();
        let march = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();

        let ok = EntryFields::new().start_day(march(1)).end_day(march(20)).score(85);
        assert!(ok.validate(&bounds).is_ok());

        let same_day = EntryFields::new().start_day(march(5)).end_day(march(5));
        assert!(same_day.validate(&bounds).is_ok());

        let backwards = EntryFields::new().start_day(march(20)).end_day(march(1));
        assert!(backwards.validate(&bounds).is_err());

        let out_of_bounds = EntryFields::new().score(101);
        assert!(out_of_bounds.validate(&bounds).is_err());

        // Open-ended windows are fine.
        assert!(EntryFields::new().start_day(march(1)).validate(&bounds).is_ok());
        assert!(EntryFields::new().end_day(march(1)).validate(&bounds).is_ok());
    }

    #[test]
    fn test_entry_round_trips_key_and_fields() {
        let key = EntryKey::new(7, 42);
        let fields = EntryFields::new().user_title("my title").score(90);
        let entry = ListEntry::from_parts(key, fields.clone());

        assert_eq!(entry.key(), key);
        assert_eq!(entry.fields(), fields);
    }
}

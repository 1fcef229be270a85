use serde::{Deserialize, Serialize};

use crate::shared::config::ScoreBounds;
use crate::shared::errors::StoreResult;
use crate::shared::utils::Validator;

/// Caller-assigned primary key of a catalog record.
pub type AnimeId = i32;

/// The title variants a series is known under. All variants are
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeTitles {
    pub native: Option<String>,
    pub romaji: Option<String>,
    pub english: Option<String>,
}

impl AnimeTitles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Best variant for display, in english > romaji > native order.
    pub fn preferred(&self) -> Option<&str> {
        self.english
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.native.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.native.is_none() && self.romaji.is_none() && self.english.is_none()
    }

    /// Case-insensitive substring match against any variant.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [&self.native, &self.romaji, &self.english]
            .into_iter()
            .flatten()
            .any(|title| title.to_lowercase().contains(&query))
    }
}

/// A canonical catalog record, one per series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimeRecord {
    pub anime_id: AnimeId,
    pub description: String,
    pub cover_s3: String,
    pub cover_anilist: String,
    /// Community average, absent until enough ratings exist.
    pub average: Option<i16>,
    pub titles: AnimeTitles,
}

impl AnimeRecord {
    pub fn new(
        anime_id: AnimeId,
        description: impl Into<String>,
        cover_s3: impl Into<String>,
        cover_anilist: impl Into<String>,
    ) -> Self {
        Self {
            anime_id,
            description: description.into(),
            cover_s3: cover_s3.into(),
            cover_anilist: cover_anilist.into(),
            average: None,
            titles: AnimeTitles::new(),
        }
    }

    pub fn with_average(mut self, average: i16) -> Self {
        self.average = Some(average);
        self
    }

    pub fn with_titles(mut self, titles: AnimeTitles) -> Self {
        self.titles = titles;
        self
    }

    pub fn validate(&self, bounds: &ScoreBounds) -> StoreResult<()> {
        Validator::validate_required("description", &self.description)?;
        Validator::validate_required("cover_s3", &self.cover_s3)?;
        Validator::validate_required("cover_anilist", &self.cover_anilist)?;
        if let Some(average) = self.average {
            Validator::validate_score("average", average, bounds)?;
        }
        Ok(())
    }
}

/// Partial update for a catalog record.
///
/// `None` leaves a field untouched. For clearable fields the outer
/// option marks presence and the inner one the new value, so
/// `Some(None)` clears. A present `anime_id` that differs from the
/// addressed record is rejected: identity is immutable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimePatch {
    pub anime_id: Option<AnimeId>,
    pub description: Option<String>,
    pub cover_s3: Option<String>,
    pub cover_anilist: Option<String>,
    pub average: Option<Option<i16>>,
    pub native: Option<Option<String>>,
    pub romaji: Option<Option<String>>,
    pub english: Option<Option<String>>,
}

impl AnimePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn anime_id(mut self, anime_id: AnimeId) -> Self {
        self.anime_id = Some(anime_id);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn cover_s3(mut self, url: impl Into<String>) -> Self {
        self.cover_s3 = Some(url.into());
        self
    }

    pub fn cover_anilist(mut self, url: impl Into<String>) -> Self {
        self.cover_anilist = Some(url.into());
        self
    }

    pub fn average(mut self, average: Option<i16>) -> Self {
        self.average = Some(average);
        self
    }

    pub fn native(mut self, title: Option<String>) -> Self {
        self.native = Some(title);
        self
    }

    pub fn romaji(mut self, title: Option<String>) -> Self {
        self.romaji = Some(title);
        self
    }

    pub fn english(mut self, title: Option<String>) -> Self {
        self.english = Some(title);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.anime_id.is_none()
            && self.description.is_none()
            && self.cover_s3.is_none()
            && self.cover_anilist.is_none()
            && self.average.is_none()
            && self.native.is_none()
            && self.romaji.is_none()
            && self.english.is_none()
    }

    /// Folds the patch into `record`. The identity field must have been
    /// checked by the caller.
    pub(crate) fn apply_to(&self, record: &mut AnimeRecord) {
        if let Some(description) = &self.description {
            record.description = description.clone();
        }
        if let Some(url) = &self.cover_s3 {
            record.cover_s3 = url.clone();
        }
        if let Some(url) = &self.cover_anilist {
            record.cover_anilist = url.clone();
        }
        if let Some(average) = self.average {
            record.average = average;
        }
        if let Some(native) = &self.native {
            record.titles.native = native.clone();
        }
        if let Some(romaji) = &self.romaji {
            record.titles.romaji = romaji.clone();
        }
        if let Some(english) = &self.english {
            record.titles.english = english.clone();
        }
    }
}

/// Sort orders the catalog can serve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimeSortKey {
    /// Ascending by primary key.
    #[default]
    Id,
    /// Ascending by community average; unrated records sort last.
    Average,
}

/// Cursor into a catalog listing. A cursor only continues requests
/// with the sort key it was produced under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimeCursor {
    Id(AnimeId),
    Average(Option<i16>, AnimeId),
}

/// Filter and order for catalog listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnimeFilter {
    /// Case-insensitive substring match against any title variant.
    pub title: Option<String>,
    pub min_average: Option<i16>,
    pub max_average: Option<i16>,
    pub sort: AnimeSortKey,
}

impl AnimeFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, query: impl Into<String>) -> Self {
        self.title = Some(query.into());
        self
    }

    pub fn min_average(mut self, min: i16) -> Self {
        self.min_average = Some(min);
        self
    }

    pub fn max_average(mut self, max: i16) -> Self {
        self.max_average = Some(max);
        self
    }

    pub fn sort(mut self, sort: AnimeSortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Unrated records never match a score-range filter.
    pub fn matches(&self, record: &AnimeRecord) -> bool {
        if let Some(query) = &self.title {
            if !record.titles.matches(query) {
                return false;
            }
        }
        if let Some(min) = self.min_average {
            match record.average {
                Some(average) if average >= min => {}
                _ => return false,
            }
        }
        if let Some(max) = self.max_average {
            match record.average {
                Some(average) if average <= max => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(english: Option<&str>, romaji: Option<&str>, native: Option<&str>) -> AnimeTitles {
        AnimeTitles {
            native: native.map(String::from),
            romaji: romaji.map(String::from),
            english: english.map(String::from),
        }
    }

    fn record() -> AnimeRecord {
        AnimeRecord::new(1, "A story", "s3://covers/1.jpg", "https://img/1.jpg")
    }

    #[test]
    fn test_preferred_title_order() {
        let titles = titled(Some("Fullmetal Alchemist"), Some("Hagane no Renkinjutsushi"), None);
        assert_eq!(titles.preferred(), Some("Fullmetal Alchemist"));

        let titles = titled(None, Some("Hagane no Renkinjutsushi"), Some("鋼の錬金術師"));
        assert_eq!(titles.preferred(), Some("Hagane no Renkinjutsushi"));

        let titles = titled(None, None, Some("鋼の錬金術師"));
        assert_eq!(titles.preferred(), Some("鋼の錬金術師"));

        assert!(AnimeTitles::new().preferred().is_none());
        assert!(AnimeTitles::new().is_empty());
    }

    #[test]
    fn test_title_match_is_case_insensitive_over_all_variants() {
        let titles = titled(Some("Cowboy Bebop"), Some("Kaubōi Bibappu"), None);

        assert!(titles.matches("bebop"));
        assert!(titles.matches("BIBAPPU"));
        assert!(!titles.matches("trigun"));
    }

    #[test]
    fn test_record_validation_requires_fields_and_bounds() {
        let bounds = ScoreBounds::default();

        assert!(record().validate(&bounds).is_ok());
        assert!(record().with_average(100).validate(&bounds).is_ok());
        assert!(record().with_average(101).validate(&bounds).is_err());

        let mut missing = record();
        missing.description = String::new();
        assert!(missing.validate(&bounds).is_err());
    }

    #[test]
    fn test_patch_updates_and_clears() {
        let mut target = record().with_average(80).with_titles(titled(Some("Old"), None, None));

        AnimePatch::new()
            .description("New story")
            .average(None)
            .english(Some("New".to_string()))
            .apply_to(&mut target);

        assert_eq!(target.description, "New story");
        assert_eq!(target.average, None);
        assert_eq!(target.titles.english.as_deref(), Some("New"));
        // Untouched fields survive.
        assert_eq!(target.cover_s3, "s3://covers/1.jpg");
    }

    #[test]
    fn test_empty_patch_reports_empty() {
        assert!(AnimePatch::new().is_empty());
        assert!(!AnimePatch::new().description("x").is_empty());
    }

    #[test]
    fn test_filter_score_range_excludes_unrated() {
        let filter = AnimeFilter::new().min_average(50);

        assert!(filter.matches(&record().with_average(50)));
        assert!(!filter.matches(&record().with_average(49)));
        assert!(!filter.matches(&record()));

        let band = AnimeFilter::new().min_average(40).max_average(60);
        assert!(band.matches(&record().with_average(60)));
        assert!(!band.matches(&record().with_average(61)));
    }

    #[test]
    fn test_filter_title_and_score_combine() {
        let filter = AnimeFilter::new().title("bebop").min_average(70);
        let hit = record()
            .with_average(90)
            .with_titles(titled(Some("Cowboy Bebop"), None, None));
        let miss_score = record()
            .with_average(30)
            .with_titles(titled(Some("Cowboy Bebop"), None, None));

        assert!(filter.matches(&hit));
        assert!(!filter.matches(&miss_score));
    }
}

/// Test data factories with sensible defaults
use chrono::NaiveDate;
use kiroku::{date_from_parts, AnimeRecord, AnimeTitles, EntryFields, UserRecord};

pub fn anime(anime_id: i32) -> AnimeRecord {
    AnimeRecord::new(
        anime_id,
        format!("Description {}", anime_id),
        format!("s3://covers/{}.jpg", anime_id),
        format!("https://img.anili.st/{}.jpg", anime_id),
    )
    .with_titles(AnimeTitles {
        native: None,
        romaji: Some(format!("Romaji {}", anime_id)),
        english: Some(format!("English {}", anime_id)),
    })
}

pub fn rated_anime(anime_id: i32, average: i16) -> AnimeRecord {
    anime(anime_id).with_average(average)
}

pub fn user(user_id: i32) -> UserRecord {
    UserRecord::new(
        user_id,
        format!("user_{}", user_id),
        format!("s3://avatars/{}.png", user_id),
        format!("https://img.anili.st/a/{}.png", user_id),
    )
}

pub fn scored_entry(score: i16) -> EntryFields {
    EntryFields::new().score(score)
}

pub fn day(year: i32, month: u32, day_of_month: u32) -> NaiveDate {
    date_from_parts(Some(year), Some(month), Some(day_of_month)).expect("valid test date")
}

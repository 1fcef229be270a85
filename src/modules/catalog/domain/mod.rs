pub mod entities;
pub mod repository;

pub use entities::{
    AnimeCursor, AnimeFilter, AnimeId, AnimePatch, AnimeRecord, AnimeSortKey, AnimeTitles,
};
pub use repository::AnimeRepository;

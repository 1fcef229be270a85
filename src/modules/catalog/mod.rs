pub mod domain;
pub mod infrastructure;

pub use domain::{
    AnimeCursor, AnimeFilter, AnimeId, AnimePatch, AnimeRecord, AnimeRepository, AnimeSortKey,
    AnimeTitles,
};
pub use infrastructure::AnimeCatalog;

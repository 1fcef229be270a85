pub mod entities;
pub mod repository;

pub use entities::{date_from_parts, EntryFields, EntryKey, ListEntry, WatchRecord};
pub use repository::ListRepository;

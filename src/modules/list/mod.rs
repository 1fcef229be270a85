pub mod domain;
pub mod infrastructure;

pub use domain::{date_from_parts, EntryFields, EntryKey, ListEntry, ListRepository, WatchRecord};
pub use infrastructure::ListStore;

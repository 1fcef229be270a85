pub mod application;

pub use application::{IngestService, SyncReport};

pub mod service;

pub use service::{IngestService, SyncReport};

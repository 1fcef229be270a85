// Shared kernel used by every bounded context.

pub mod application; // Pagination and streaming helpers
pub mod config; // Store-wide tunables
pub mod errors; // Shared error taxonomy
pub mod infrastructure; // Backing tables
pub mod utils; // Validation, logging

pub use config::{CascadePolicy, ScoreBounds, StoreConfig, StoreConfigBuilder};
pub use errors::{Entity, StoreError, StoreResult};

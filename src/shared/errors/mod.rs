pub mod store_error;

pub use store_error::{Entity, StoreError, StoreResult};

pub mod domain;
pub mod infrastructure;

pub use domain::{UserFilter, UserId, UserPatch, UserRecord, UserRepository};
pub use infrastructure::UserDirectory;

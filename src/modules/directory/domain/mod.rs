pub mod entities;
pub mod repository;

pub use entities::{UserFilter, UserId, UserPatch, UserRecord};
pub use repository::UserRepository;

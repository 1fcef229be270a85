pub mod store;

pub use store::UserDirectory;

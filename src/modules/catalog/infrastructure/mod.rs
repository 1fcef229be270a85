pub mod store;

pub use store::AnimeCatalog;

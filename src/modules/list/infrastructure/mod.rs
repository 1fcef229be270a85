pub mod store;

pub use store::ListStore;

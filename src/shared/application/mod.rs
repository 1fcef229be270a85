/// Shared application layer patterns
///
/// This module contains application-level abstractions used across
/// multiple bounded contexts.
pub mod pagination;

pub use pagination::{stream_pages, Page, PageRequest, DEFAULT_PAGE_LIMIT};

/// Shared infrastructure concerns
///
/// The backing tables live here because every engine reads at least
/// one table owned by another component.
pub(crate) mod memory;

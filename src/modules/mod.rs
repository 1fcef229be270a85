// Bounded contexts of the store.

pub mod catalog; // Canonical anime records
pub mod directory; // Account profiles
pub mod ingest; // External sync reconciliation
pub mod list; // Per-user watch lists

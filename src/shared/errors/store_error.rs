use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// The record kinds the store manages, used to build uniform error
/// messages across components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Entity {
    Anime,
    User,
    ListEntry,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Anime => write!(f, "anime"),
            Entity::User => write!(f, "user"),
            Entity::ListEntry => write!(f, "list entry"),
        }
    }
}

#[derive(Error, Debug, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum StoreError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Duplicate identity: {0}")]
    DuplicateIdentity(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Dangling reference: {0}")]
    DanglingReference(String),

    #[error("Referential conflict: {0}")]
    ReferentialConflict(String),

    #[error("Immutable field: {0}")]
    ImmutableField(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::ValidationError(message.into())
    }

    pub fn duplicate(entity: Entity, id: impl fmt::Display) -> Self {
        StoreError::DuplicateIdentity(format!("{} {} already exists", entity, id))
    }

    pub fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        StoreError::NotFound(format!("{} {} does not exist", entity, id))
    }

    pub fn dangling(entity: Entity, id: impl fmt::Display) -> Self {
        StoreError::DanglingReference(format!("{} {} does not exist", entity, id))
    }

    pub fn conflict(entity: Entity, id: impl fmt::Display, dependents: usize) -> Self {
        StoreError::ReferentialConflict(format!(
            "{} {} is referenced by {} list entries",
            entity, id, dependents
        ))
    }

    pub fn immutable(entity: Entity, field: &str) -> Self {
        StoreError::ImmutableField(format!("{} field '{}' cannot be changed", entity, field))
    }

    pub fn config(message: impl Into<String>) -> Self {
        StoreError::InvalidConfig(message.into())
    }
}

// Result type alias for convenience
pub type StoreResult<T> = Result<T, StoreError>;

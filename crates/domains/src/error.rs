//! # DomainError
//!
//! Centralized error handling for the blood bank engine.
//! Every operation returns these synchronously to its immediate caller; nothing is retried.

use thiserror::Error;

/// The primary error type for all engine operations.
#[derive(Error, Debug)]
pub enum DomainError {
    /// Referenced entity is absent from its collection (e.g. Donor, BloodRequest, BloodUnit)
    #[error("{0} not found with ID {1}")]
    NotFound(&'static str, String),

    /// The backing store failed to load or save a collection
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Status change outside the allowed edges of a lifecycle
    #[error("invalid state transition: {0}")]
    State(String),

    /// Caller-supplied data rejected (e.g. zero units needed, empty unit code)
    #[error("validation error: {0}")]
    Validation(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DomainError::NotFound(entity, id.to_string())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DomainError::NotFound(..))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::Persistence(format!("serialization failed: {err}"))
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        DomainError::Persistence(err.to_string())
    }
}

/// A specialized Result type for blood bank logic.
pub type Result<T> = std::result::Result<T, DomainError>;

//! Domain-level error types.

use thiserror::Error;

/// Domain errors - input that breaks a business rule.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// Unique key collision.
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// A row points at a parent that does not exist.
    #[error("Missing reference: {0}")]
    MissingReference(String),
}

//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate tool name: {0}")]
    DuplicateTool(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Unknown server: {0}")]
    UnknownServer(String),
}

//! Error types for envelope-types crate.

use thiserror::Error;

/// Errors that can occur while resolving payload types.
#[derive(Error, Debug)]
pub enum EnvelopeTypesError {
    #[error("Payload type not found: {0}")]
    TypeNotFound(String),

    #[error("Payload type already registered: {0}")]
    DuplicateType(String),

    #[error("Payload type name must not be empty")]
    EmptyTypeName,
}

/// Result type alias for envelope-types operations.
pub type Result<T> = std::result::Result<T, EnvelopeTypesError>;

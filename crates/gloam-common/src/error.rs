//! Error types for Gloam.

use thiserror::Error;

/// Top-level error type for Gloam operations.
///
/// Combat resolution never produces errors; everything here is a load-time
/// failure (bad content reference, unreadable config) that callers treat as
/// a level-load defect.
#[derive(Debug, Error)]
pub enum GloamError {
    /// Content definition errors
    #[error("Content error: {0}")]
    Content(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// Deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Gloam operations.
pub type GloamResult<T> = Result<T, GloamError>;

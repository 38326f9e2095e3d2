//! Credential store error types.

use thiserror::Error;

/// Errors that can occur while persisting or loading credentials
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("Credential file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization to JSON failed
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Deserialization from JSON failed
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// Stored document version is not supported by this version
    #[error("Unsupported credential file version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}

//! Centralized error types for mimeattach.

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::transfer::DecodeFailure;

/// All errors produced by the mimeattach library.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// The owning message's decode service rejected the payload.
    ///
    /// Construction is aborted; no partial attachment is produced.
    #[error("Failed to decode {encoding} payload: {source}")]
    PayloadDecode {
        encoding: String,
        source: DecodeFailure,
    },

    /// `mask()` was asked for an identifier that no registered view answers to.
    #[error("Unknown mask provided: {0}")]
    AdapterNotFound(String),

    /// A generic accessor targeted a read-only attribute, or the value does not
    /// fit the attribute's type.
    #[error("Accessor is not supported: {0}")]
    UnsupportedAccessor(String),

    /// I/O error with the associated file path.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A body-part manifest could not be parsed.
    #[error("Invalid body part manifest: {0}")]
    Manifest(String),
}

/// Convenience alias for `Result<T, AttachmentError>`.
pub type Result<T> = std::result::Result<T, AttachmentError>;

impl AttachmentError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

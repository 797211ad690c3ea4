//! Dataset ingestion error types
//!
//! Raised while turning an uploaded file into a server-side dataset.
//!
//! # Examples
//!
//! ```rust
//! use shopintel::errors::IngestionError;
//!
//! let err = IngestionError::Transport("connection refused".to_string());
//! assert_eq!(err.to_string(), "Transport error: connection refused");
//! assert_eq!(err.error_code(), "TRANSPORT_ERROR");
//! ```

use thiserror::Error;

/// Dataset ingestion errors
#[derive(Error, Debug)]
pub enum IngestionError {
    /// The selected file has no content
    #[error("File '{0}' is empty")]
    EmptyFile(String),

    /// The file type cannot be ingested
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The backend refused the upload
    #[error("Upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not a dataset
    #[error("Invalid ingestion response: {0}")]
    InvalidResponse(String),

    /// Reading the local file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestionError {
    /// Check if the failure was caused by the submitted file
    pub fn is_client_error(&self) -> bool {
        match self {
            IngestionError::EmptyFile(_) | IngestionError::UnsupportedFormat(_) => true,
            IngestionError::Rejected { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }

    /// Get error code for API and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestionError::EmptyFile(_) | IngestionError::UnsupportedFormat(_) => {
                "VALIDATION_FAILED"
            }
            IngestionError::Rejected { .. } => "REJECTED",
            IngestionError::Transport(_) => "TRANSPORT_ERROR",
            IngestionError::InvalidResponse(_) => "INVALID_RESPONSE",
            IngestionError::Io(_) => "IO_ERROR",
        }
    }
}

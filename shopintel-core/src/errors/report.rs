//! Report rendering and sharing error types

use thiserror::Error;

/// Report rendering and saving errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// Template failed to compile
    #[error("Invalid report template: {0}")]
    InvalidTemplate(#[from] handlebars::TemplateError),

    /// Template failed to render against the report context
    #[error("Report rendering failed: {0}")]
    Template(#[from] handlebars::RenderError),

    /// JSON serialization of the report context failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Report format name not recognised
    #[error("Unsupported report format: {0}")]
    UnsupportedFormat(String),

    /// Saving the rendered document failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// External renderer failure
    #[error("Renderer failed: {0}")]
    Failed(String),
}

impl RenderError {
    pub fn error_code(&self) -> &'static str {
        match self {
            RenderError::InvalidTemplate(_) | RenderError::Template(_) => "TEMPLATE_ERROR",
            RenderError::Json(_) => "JSON_ERROR",
            RenderError::UnsupportedFormat(_) => "VALIDATION_FAILED",
            RenderError::Io(_) => "IO_ERROR",
            RenderError::Failed(_) => "OPERATION_FAILED",
        }
    }
}

/// Share registration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ShareError {
    /// Backend does not know the dataset
    #[error("Dataset {0} not found")]
    DatasetNotFound(String),

    /// The backend refused to register the share
    #[error("Share rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered without a share URL
    #[error("Invalid share response: {0}")]
    InvalidResponse(String),
}

impl ShareError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ShareError::DatasetNotFound(_) => "NOT_FOUND",
            ShareError::Rejected { .. } => "REJECTED",
            ShareError::Transport(_) => "TRANSPORT_ERROR",
            ShareError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}

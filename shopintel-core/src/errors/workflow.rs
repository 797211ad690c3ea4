//! Workflow controller, terms and configuration error types

use thiserror::Error;

use super::{IngestionError, RenderError, ShareError};
use crate::workflow::WorkflowPhase;

/// Errors returned by workflow controller actions
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// An upload or analysis cycle is already in flight
    #[error("Workflow is busy ({0})")]
    Busy(WorkflowPhase),

    /// The action needs an uploaded dataset
    #[error("No dataset has been uploaded")]
    NoDataset,

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Share(#[from] ShareError),
}

impl WorkflowError {
    pub fn error_code(&self) -> &'static str {
        match self {
            WorkflowError::Busy(_) => "CONFLICT",
            WorkflowError::NoDataset => "PRECONDITION_FAILED",
            WorkflowError::Ingestion(err) => err.error_code(),
            WorkflowError::Render(err) => err.error_code(),
            WorkflowError::Share(err) => err.error_code(),
        }
    }
}

/// Terms-of-service acceptance errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TermsError {
    #[error("All terms must be read and acknowledged before accepting")]
    NotAcknowledged,
}

/// Client configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid API URL '{value}': {reason}")]
    InvalidUrl { value: String, reason: String },

    #[error("Invalid request timeout '{0}'")]
    InvalidTimeout(String),

    #[error("Unsupported report format: {0}")]
    InvalidReportFormat(String),
}

//! KPI analysis and forecast error types

use thiserror::Error;

/// KPI computation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Backend does not know the dataset
    #[error("Dataset {0} not found")]
    DatasetNotFound(String),

    /// Result belongs to a different dataset than the one requested
    #[error("KPI result for dataset {actual} does not match requested dataset {expected}")]
    DatasetMismatch { expected: String, actual: String },

    /// The backend refused the analysis
    #[error("Analysis rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not a KPI set
    #[error("Invalid analysis response: {0}")]
    InvalidResponse(String),
}

impl AnalysisError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AnalysisError::DatasetNotFound(_) => "NOT_FOUND",
            AnalysisError::DatasetMismatch { .. } => "CONFLICT",
            AnalysisError::Rejected { .. } => "REJECTED",
            AnalysisError::Transport(_) => "TRANSPORT_ERROR",
            AnalysisError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}

/// Forecast generation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Backend does not know the dataset
    #[error("Dataset {0} not found")]
    DatasetNotFound(String),

    /// Result belongs to a different dataset than the one requested
    #[error("Forecast for dataset {actual} does not match requested dataset {expected}")]
    DatasetMismatch { expected: String, actual: String },

    /// The model ran but reported failure (e.g. not enough history)
    #[error("Forecast failed: {0}")]
    Failed(String),

    /// The backend refused the request
    #[error("Forecast rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with something that is not a forecast
    #[error("Invalid forecast response: {0}")]
    InvalidResponse(String),
}

impl ForecastError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ForecastError::DatasetNotFound(_) => "NOT_FOUND",
            ForecastError::DatasetMismatch { .. } => "CONFLICT",
            ForecastError::Failed(_) => "OPERATION_FAILED",
            ForecastError::Rejected { .. } => "REJECTED",
            ForecastError::Transport(_) => "TRANSPORT_ERROR",
            ForecastError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}

//! Domain-specific error types for shopintel-core
//!
//! Every collaborator of the dashboard workflow has its own error type so
//! callers can tell a terminal failure (ingestion) from a partial one
//! (analysis or forecast) without string matching.
//!
//! # Error Categories
//!
//! - **IngestionError**: dataset upload
//! - **AnalysisError** / **ForecastError**: KPI computation and forecasting
//! - **RenderError**: report rendering and saving
//! - **ShareError**: share-link registration
//! - **AdminActionError**: user administration
//! - **WorkflowError**: controller-level failures, wrapping the above
//!
//! # Examples
//!
//! ```rust
//! use shopintel::errors::{AnalysisError, WorkflowError};
//!
//! let err = AnalysisError::DatasetNotFound("d1".to_string());
//! assert_eq!(err.error_code(), "NOT_FOUND");
//!
//! let err = WorkflowError::NoDataset;
//! assert_eq!(err.to_string(), "No dataset has been uploaded");
//! ```

pub mod admin;
pub mod analysis;
pub mod ingestion;
pub mod report;
pub mod workflow;

// Re-export all error types
pub use admin::AdminActionError;
pub use analysis::{AnalysisError, ForecastError};
pub use ingestion::IngestionError;
pub use report::{RenderError, ShareError};
pub use workflow::{ConfigError, TermsError, WorkflowError};

/// Result type alias for dataset ingestion
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Result type alias for KPI computation
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Result type alias for forecast generation
pub type ForecastResult<T> = Result<T, ForecastError>;

/// Result type alias for report rendering
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type alias for share registration
pub type ShareResult<T> = Result<T, ShareError>;

/// Result type alias for admin actions
pub type AdminResult<T> = Result<T, AdminActionError>;

/// Result type alias for workflow controller actions
pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingestion_result_alias() {
        let result: IngestionResult<()> = Err(IngestionError::EmptyFile("a.csv".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_admin_result_alias() {
        let result: AdminResult<()> = Err(AdminActionError::UnknownToken);
        assert!(result.is_err());
    }

    #[test]
    fn test_workflow_result_alias() {
        let result: WorkflowResult<()> = Err(WorkflowError::NoDataset);
        assert!(result.is_err());
    }
}

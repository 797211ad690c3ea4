//! Transport-level failures and their mapping onto the domain error types.

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use shopintel::errors::{
    AdminActionError, AnalysisError, ConfigError, ForecastError, IngestionError, ShareError,
};
use shopintel::models::DatasetId;

/// Failure of a single API call before any domain meaning is attached.
#[derive(Error, Debug)]
pub enum ApiFailure {
    /// Non-2xx response
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// Connection, timeout or TLS failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// 2xx response whose body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiFailure {
    /// Build from an error response, preferring FastAPI's `detail` field.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        ApiFailure::Status {
            status: status.as_u16(),
            message: error_message(status, body),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiFailure::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn into_analysis_error(self, dataset_id: &DatasetId) -> AnalysisError {
        match self {
            failure if failure.is_not_found() => {
                AnalysisError::DatasetNotFound(dataset_id.to_string())
            }
            ApiFailure::Status { status, message } => AnalysisError::Rejected { status, message },
            ApiFailure::Transport(reason) => AnalysisError::Transport(reason),
            ApiFailure::Decode(reason) => AnalysisError::InvalidResponse(reason),
            ApiFailure::Config(err) => AnalysisError::Transport(err.to_string()),
        }
    }

    pub fn into_forecast_error(self, dataset_id: &DatasetId) -> ForecastError {
        match self {
            failure if failure.is_not_found() => {
                ForecastError::DatasetNotFound(dataset_id.to_string())
            }
            ApiFailure::Status { status, message } => ForecastError::Rejected { status, message },
            ApiFailure::Transport(reason) => ForecastError::Transport(reason),
            ApiFailure::Decode(reason) => ForecastError::InvalidResponse(reason),
            ApiFailure::Config(err) => ForecastError::Transport(err.to_string()),
        }
    }

    pub fn into_share_error(self, dataset_id: &DatasetId) -> ShareError {
        match self {
            failure if failure.is_not_found() => ShareError::DatasetNotFound(dataset_id.to_string()),
            ApiFailure::Status { status, message } => ShareError::Rejected { status, message },
            ApiFailure::Transport(reason) => ShareError::Transport(reason),
            ApiFailure::Decode(reason) => ShareError::InvalidResponse(reason),
            ApiFailure::Config(err) => ShareError::Transport(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiFailure::Decode(err.to_string())
        } else {
            ApiFailure::Transport(err.to_string())
        }
    }
}

impl From<ApiFailure> for IngestionError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Status { status, message } => IngestionError::Rejected { status, message },
            ApiFailure::Transport(reason) => IngestionError::Transport(reason),
            ApiFailure::Decode(reason) => IngestionError::InvalidResponse(reason),
            ApiFailure::Config(err) => IngestionError::Transport(err.to_string()),
        }
    }
}

impl From<ApiFailure> for AdminActionError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Status {
                status: 401 | 403,
                message,
            } => AdminActionError::Forbidden(message),
            ApiFailure::Status { status, message } => AdminActionError::Rejected { status, message },
            ApiFailure::Transport(reason) => AdminActionError::Transport(reason),
            ApiFailure::Decode(reason) => AdminActionError::InvalidResponse(reason),
            ApiFailure::Config(err) => AdminActionError::Transport(err.to_string()),
        }
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());
    match detail {
        Some(Value::String(message)) => message,
        // validation errors arrive as a list of objects
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.get("msg")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| item.to_string())
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string(),
    }
}

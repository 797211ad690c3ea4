//! User administration error types

use thiserror::Error;

use crate::models::UserId;

/// Admin action errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdminActionError {
    /// User is not part of the loaded roster
    #[error("User {0} not found")]
    UnknownUser(UserId),

    /// Deactivation requested for a user that is already inactive
    #[error("User {0} is already inactive")]
    AlreadyInactive(UserId),

    /// Confirmation token was never issued, or has already been used
    #[error("Unknown or expired confirmation token")]
    UnknownToken,

    /// Caller lacks admin rights
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The backend refused the action
    #[error("Admin action rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request never produced a response
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend answered with an unexpected payload
    #[error("Invalid admin response: {0}")]
    InvalidResponse(String),

    /// The action was applied but reloading the admin data failed
    #[error("Action applied but reload failed: {0}")]
    Reload(String),
}

impl AdminActionError {
    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        match self {
            AdminActionError::UnknownUser(_)
            | AdminActionError::AlreadyInactive(_)
            | AdminActionError::UnknownToken
            | AdminActionError::Forbidden(_) => true,
            AdminActionError::Rejected { status, .. } => (400..500).contains(status),
            _ => false,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            AdminActionError::UnknownUser(_) => "NOT_FOUND",
            AdminActionError::AlreadyInactive(_) => "CONFLICT",
            AdminActionError::UnknownToken => "VALIDATION_FAILED",
            AdminActionError::Forbidden(_) => "FORBIDDEN",
            AdminActionError::Rejected { .. } => "REJECTED",
            AdminActionError::Transport(_) => "TRANSPORT_ERROR",
            AdminActionError::InvalidResponse(_) => "INVALID_RESPONSE",
            AdminActionError::Reload(_) => "RELOAD_FAILED",
        }
    }
}

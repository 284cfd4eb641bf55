//! crates/recap_core/src/error.rs
//!
//! The error taxonomy surfaced by the account and summary services.

use crate::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Malformed or missing input.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    /// Unknown id or a resource owned by someone else. The two are deliberately
    /// indistinguishable to the caller.
    #[error("Summary not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),

    /// An external collaborator (extraction, rendering, mail) failed.
    #[error("{0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<PortError> for ServiceError {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(_) => ServiceError::NotFound,
            PortError::Conflict(msg) => ServiceError::Conflict(msg),
            PortError::Unauthorized => {
                ServiceError::Unauthenticated("Invalid or expired token".to_string())
            }
            PortError::Unexpected(msg) => ServiceError::Internal(msg),
        }
    }
}

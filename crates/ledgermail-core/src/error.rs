//! Error types for the core module

use thiserror::Error;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for calls into external collaborators
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Failure reported by a collaborator service.
///
/// Mirrors the `{ "code": .., "message": .. }` error bodies returned by the
/// sending service; `code` is absent when the failure never reached it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ServiceError {
    /// Error code reported by the service
    pub code: Option<u16>,
    /// Human readable message
    pub message: String,
}

impl ServiceError {
    pub fn new(code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Error code formatted for display, `"unknown"` when absent
    pub fn code_display(&self) -> String {
        self.code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Errors that can occur in compose operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// Draft has no resolved recipient
    #[error("No valid recipient address")]
    MissingRecipient,

    /// A submission is already running
    #[error("A message is already being sent")]
    SubmitInProgress,

    /// Public key lookup failed
    #[error("Public key lookup failed: {0}")]
    PublicKeyLookup(ServiceError),

    /// Send failed
    #[error("Failed to send message: {0}")]
    SendFailed(ServiceError),
}

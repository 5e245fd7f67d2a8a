//! Error kinds surfaced by the engine

use thiserror::Error;

/// Every failure an engine operation can report
///
/// Each kind leaves session state untouched: operations are all-or-nothing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Malformed or empty field, rejected before any mutation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing or unrecognised caller identity
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Caller is authenticated but not a participant
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Unknown session, argument or join token
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// State machine or uniqueness violation
    #[error("conflict: {0}")]
    Conflict(String),

    /// The judge failed or timed out; safe to retry
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// Poisoned per-session lock
    #[error("internal error: {0}")]
    Internal(String),
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFailure(message.into())
    }

    /// Stable machine-readable code
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::Unauthorized(_) => "unauthorized",
            Self::Forbidden(_) => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Conflict(_) => "conflict",
            Self::UpstreamFailure(_) => "upstream_failure",
            Self::Internal(_) => "internal",
        }
    }
}

/// Failure reported by a judge collaborator
#[derive(Error, Debug)]
pub enum JudgeError {
    #[error("judge is not configured: {0}")]
    NotConfigured(String),

    #[error("judge request failed: {0}")]
    Transport(String),

    #[error("judge returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("judge response unusable: {0}")]
    BadResponse(String),
}

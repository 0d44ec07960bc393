//! Error taxonomy for code issuance and verification.

use thiserror::Error;

use crate::domain::entities::channel::Channel;

/// Failure reported by an external collaborator
///
/// Every collaborator seam (`CodeStore`, `ChannelTransport`,
/// `CredentialDirectory`) returns this type so the orchestrators can decide
/// about retries without knowing the concrete backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    /// Backend unreachable or failing on its side (connection refused, 5xx, ...)
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Backend refused the request; repeating it will not help
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request deadline expired before the call completed
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CollaboratorError {
    /// Whether repeating the same call may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollaboratorError::Unavailable(_) | CollaboratorError::DeadlineExceeded
        )
    }
}

/// Errors surfaced by the issuance and verification services
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Invalid {channel} destination format: {destination}")]
    InvalidFormat {
        channel: Channel,
        /// Masked destination, safe to log
        destination: String,
    },

    #[error("Unsupported verification channel: {code}")]
    UnsupportedChannel { code: i32 },

    #[error("Verification code not found or expired")]
    CodeNotFoundOrExpired,

    #[error("Verification code mismatch, {remaining_attempts} attempt(s) remaining")]
    VerificationMismatch { remaining_attempts: u32 },

    #[error("Maximum verification attempts ({max_attempts}) exceeded, request a new code")]
    AttemptsExceeded { max_attempts: u32 },

    #[error("{service} failure: {source}")]
    RemoteLookupFailure {
        service: &'static str,
        #[source]
        source: CollaboratorError,
    },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },
}

impl VerificationError {
    pub(crate) fn remote(service: &'static str, source: CollaboratorError) -> Self {
        VerificationError::RemoteLookupFailure { service, source }
    }

    /// Whether the orchestrator may retry the failed step
    pub fn is_retryable(&self) -> bool {
        match self {
            VerificationError::RemoteLookupFailure { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Stable machine-readable code for API layers
    pub fn error_code(&self) -> &'static str {
        match self {
            VerificationError::InvalidFormat { .. } => "INVALID_FORMAT",
            VerificationError::UnsupportedChannel { .. } => "UNSUPPORTED_CHANNEL",
            VerificationError::CodeNotFoundOrExpired => "CODE_NOT_FOUND_OR_EXPIRED",
            VerificationError::VerificationMismatch { .. } => "VERIFICATION_MISMATCH",
            VerificationError::AttemptsExceeded { .. } => "ATTEMPTS_EXCEEDED",
            VerificationError::RemoteLookupFailure { .. } => "SERVICE_UNAVAILABLE",
            VerificationError::NotFound { .. } => "NOT_FOUND",
        }
    }
}

pub type VerificationResult<T> = Result<T, VerificationError>;

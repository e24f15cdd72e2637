use thiserror::Error;

/// Errors raised while talking to the template backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("No credential available for this request")]
    MissingCredential,
    #[error("Session rejected (HTTP {0})")]
    Unauthorized(u16),
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// How a failed request is surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Credential missing or refused; the host should send the user to login
    SessionExpired,
    /// Network or server trouble; the user may simply try again
    Retryable,
    /// The backend refused the action itself
    NonRetryable,
}

impl ApiError {
    /// Map a non-success HTTP status to an error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 | 403 => ApiError::Unauthorized(status),
            500..=599 => ApiError::Server { status, message },
            _ => ApiError::Rejected { status, message },
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            ApiError::MissingCredential | ApiError::Unauthorized(_) => FailureKind::SessionExpired,
            ApiError::Server { .. }
            | ApiError::Network(_)
            | ApiError::Decode(_)
            | ApiError::Client(_) => FailureKind::Retryable,
            ApiError::Rejected { .. } => FailureKind::NonRetryable,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(status) => Some(*status),
            ApiError::Server { status, .. } | ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if err.is_timeout() {
            ApiError::Network(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            ApiError::Network(format!("Connection failed: {}", err))
        } else if err.is_builder() {
            ApiError::Client(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::from_status(status.as_u16(), err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

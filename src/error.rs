//! Unified error hierarchy for readyrs
//!
//! The scoring engines are total functions and never produce errors; every
//! failure here comes from the API client, credential storage or
//! configuration.

use crate::credentials::CredentialsError;
use thiserror::Error;

/// Top-level error type for all readyrs operations
#[derive(Debug, Error)]
pub enum ReadyRsError {
    /// intervals.icu API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Credential storage errors
    #[error("Credentials error: {0}")]
    Credentials(#[from] CredentialsError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the intervals.icu client
#[derive(Debug, Error)]
pub enum ApiError {
    /// No API key / athlete id available
    #[error("No intervals.icu credentials found")]
    NoCredentials,

    /// HTTP 401
    #[error("Unauthorized (401)")]
    Unauthorized,

    /// HTTP 403
    #[error("Forbidden (403): {0}")]
    Forbidden(String),

    /// HTTP 422
    #[error("Invalid request parameters (422): {0}")]
    InvalidParameters(String),

    /// Any other non-2xx response
    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    /// Connection, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not the expected JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Base URL or endpoint could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(e: url::ParseError) -> Self {
        ApiError::InvalidUrl(e.to_string())
    }
}

impl ApiError {
    /// Map a non-success HTTP status and its body to an error
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(body),
            422 => ApiError::InvalidParameters(body),
            _ => ApiError::Server { status, body },
        }
    }

    /// HTTP status behind the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::InvalidParameters(_) => Some(422),
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for readyrs operations
pub type Result<T> = std::result::Result<T, ReadyRsError>;

impl ReadyRsError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ReadyRsError::Api(ApiError::NoCredentials) => ErrorSeverity::Warning,
            ReadyRsError::Api(ApiError::InvalidParameters(_)) => ErrorSeverity::Warning,
            ReadyRsError::Api(_) => ErrorSeverity::Error,
            ReadyRsError::Credentials(_) => ErrorSeverity::Error,
            ReadyRsError::Config(_) => ErrorSeverity::Error,
            ReadyRsError::Io(_) => ErrorSeverity::Critical,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            ReadyRsError::Api(ApiError::NoCredentials) => {
                "No intervals.icu credentials found. Run `readyrs connect` first.".to_string()
            }
            ReadyRsError::Api(ApiError::Unauthorized) => {
                "Invalid API key or athlete ID. Please check your credentials.".to_string()
            }
            ReadyRsError::Api(ApiError::Forbidden(body)) => {
                format!("Access forbidden. Error: {}", body)
            }
            ReadyRsError::Api(ApiError::InvalidParameters(body)) => {
                format!("Invalid request parameters: {}", body)
            }
            ReadyRsError::Api(ApiError::Server { status, body }) => {
                format!("Failed to fetch data: {} - {}", status, body)
            }
            ReadyRsError::Api(ApiError::Transport(reason)) => {
                format!("Could not reach intervals.icu: {}", reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}

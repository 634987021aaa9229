//! Unified application error types for Gatehouse.
//!
//! Every component maps its failures into [`AppError`] so they propagate
//! through `?` with a single type. The [`ErrorKind`] decides how the HTTP
//! surface renders the failure: authentication-stage kinds collapse to one
//! generic login failure, authorization denial goes to the forbidden page,
//! and infrastructure failures surface as server errors.

use std::fmt;

use thiserror::Error;

/// Top-level error kind categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No credential exists for the submitted username.
    NotFound,
    /// The submitted password does not match the stored hash.
    BadCredentials,
    /// The principal already holds the maximum number of live sessions.
    SessionLimitExceeded,
    /// The authorization policy denied the request.
    PolicyDenied,
    /// A backing collaborator (credential store) is unavailable.
    Infrastructure,
    /// Input validation failed.
    Validation,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl ErrorKind {
    /// Whether this kind belongs to the authentication stage.
    ///
    /// All of these render identically to the client.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            Self::NotFound | Self::BadCredentials | Self::SessionLimitExceeded
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::BadCredentials => write!(f, "BAD_CREDENTIALS"),
            Self::SessionLimitExceeded => write!(f, "SESSION_LIMIT_EXCEEDED"),
            Self::PolicyDenied => write!(f, "POLICY_DENIED"),
            Self::Infrastructure => write!(f, "INFRASTRUCTURE"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout Gatehouse.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a bad-credentials error.
    pub fn bad_credentials(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadCredentials, message)
    }

    /// Create a session-limit error.
    pub fn session_limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SessionLimitExceeded, message)
    }

    /// Create a policy-denied error.
    pub fn policy_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PolicyDenied, message)
    }

    /// Create an infrastructure error.
    pub fn infrastructure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Infrastructure, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Infrastructure, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

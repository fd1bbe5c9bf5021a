//! Error types for Thoughts
//!
//! `NotFound` and `Deny` outcomes of the thought lifecycle are not errors; they
//! travel as [`crate::lifecycle::Access`] values. Everything here is either a
//! malformed request or an unexpected fault.

use hyper::StatusCode;

/// Main error type for Thoughts operations
#[derive(Debug, thiserror::Error)]
pub enum ThoughtsError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("OAuth error: {0}")]
    OAuth(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ThoughtsError {
    /// Convert error to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::OAuth(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is an unexpected fault (logged and shown as the 500 page)
    /// rather than a problem with the request itself.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::Config(_) | Self::OAuth(_) | Self::Internal(_)
        )
    }
}

impl From<std::io::Error> for ThoughtsError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ThoughtsError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<serde_urlencoded::de::Error> for ThoughtsError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        Self::BadRequest(format!("Form error: {}", err))
    }
}

impl From<mongodb::error::Error> for ThoughtsError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<bson::oid::Error> for ThoughtsError {
    fn from(err: bson::oid::Error) -> Self {
        Self::BadRequest(format!("Invalid id: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for ThoughtsError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Unauthorized(format!("JWT error: {}", err))
    }
}

impl From<reqwest::Error> for ThoughtsError {
    fn from(err: reqwest::Error) -> Self {
        Self::OAuth(err.to_string())
    }
}

/// Result type alias for Thoughts operations
pub type Result<T> = std::result::Result<T, ThoughtsError>;

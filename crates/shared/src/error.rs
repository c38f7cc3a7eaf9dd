//! Errors raised at the service edge: bearer authentication, configuration
//! and database connectivity.

use thiserror::Error;

use crate::jwt::JwtError;

/// Result type alias using `AppError`.
pub type AppResult<T> = Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// No usable credentials, or they name no active user.
    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    /// The bearer token was rejected.
    #[error("Authentication failed: {0}")]
    Token(#[from] JwtError),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) | Self::Token(_) => 401,
            Self::Config(_) | Self::Database(_) => 500,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "UNAUTHORIZED",
            Self::Token(JwtError::Expired) => "TOKEN_EXPIRED",
            Self::Token(JwtError::DecodingError(_)) => "INVALID_TOKEN",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }
}

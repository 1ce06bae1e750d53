//! Error types for Velrath
//!
//! This module defines the error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! Two kinds of failure exist. [`VelrathError`] covers the plumbing
//! (configuration, storage, HTTP, terminal I/O) and travels as an
//! `anyhow::Error`. [`AuthError`] is the typed, user-facing failure returned
//! across the bridge by `authenticate`; it always carries a printable message.

use thiserror::Error;

/// Message shown when the identity API gives no better explanation.
pub const INVALID_CREDENTIAL_MESSAGE: &str = "Invalid token";

/// Main error type for Velrath operations
#[derive(Error, Debug)]
pub enum VelrathError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session store errors (file access, encoding)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Discord API client errors outside of authentication
    #[error("Discord API error: {0}")]
    Discord(String),

    /// A credential was rejected
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Host bridge errors (event channel closed, window already closed)
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Interactive prompt errors
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Failure returned by the bridge's `authenticate` operation.
///
/// The message is what the login page shows verbatim. Construction goes
/// through [`AuthError::new`], which substitutes [`INVALID_CREDENTIAL_MESSAGE`]
/// for blank input so the message is never empty.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthError {
    message: String,
}

impl AuthError {
    /// Creates an authentication failure with a human-readable message.
    ///
    /// # Examples
    ///
    /// ```
    /// use velrath::error::AuthError;
    ///
    /// assert_eq!(AuthError::new("401: Unauthorized").message(), "401: Unauthorized");
    /// assert_eq!(AuthError::new("   ").message(), "Invalid token");
    /// ```
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::invalid_credential();
        }
        Self { message }
    }

    /// The generic failure used when nothing more specific is known.
    pub fn invalid_credential() -> Self {
        Self {
            message: INVALID_CREDENTIAL_MESSAGE.to_string(),
        }
    }

    /// The user-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Result type alias for Velrath operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

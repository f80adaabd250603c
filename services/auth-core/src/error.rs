//! Error types for credential and token operations.
//!
//! Two kinds of failure exist:
//! - [`AuthError`] for configuration and internal library failures, which are
//!   fatal at startup or indicate a broken deployment
//! - [`InvalidToken`] for any rejected access token, deliberately carrying no
//!   cause so callers cannot tell an expired token from a forged one

use thiserror::Error;

/// Fatal or internal failure of the credential helper.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthError {
    /// Configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token could not be signed
    #[error("JWT encoding error: {0}")]
    Encoding(String),

    /// Password could not be hashed
    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl AuthError {
    /// Create a configuration error with the given message.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an encoding error with the given message.
    #[must_use]
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a hashing error with the given message.
    #[must_use]
    pub fn hashing(msg: impl Into<String>) -> Self {
        Self::Hashing(msg.into())
    }

    /// Whether this error must abort process startup.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::Encoding(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Hashing(err.to_string())
    }
}

/// A presented access token was rejected.
///
/// Malformed, badly signed, wrongly algorithmed and expired tokens all map to
/// this one value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid or expired token")]
pub struct InvalidToken;

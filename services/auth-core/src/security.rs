//! Process-wide entry point for token and password operations.
//!
//! Build one [`SecurityContext`] at startup and share it by reference or
//! `Arc`; every method takes `&self` and touches no mutable state.

use crate::config::SecurityConfig;
use crate::error::{AuthError, InvalidToken};
use crate::jwt::{AccessTokenCodec, Claims};
use crate::password::PasswordHasher;
use std::fmt;
use std::time::Duration;
use tracing::info;

/// Token codec and password hasher built from one configuration.
#[derive(Debug)]
pub struct SecurityContext {
    tokens: AccessTokenCodec,
    passwords: PasswordHasher,
}

impl SecurityContext {
    /// Validate `config` and build the signing keys.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty key or invalid parameters.
    pub fn new(config: &SecurityConfig) -> Result<Self, AuthError> {
        config.validate()?;

        let context = Self {
            tokens: AccessTokenCodec::new(config)?,
            passwords: PasswordHasher::new(config)?,
        };

        info!(
            algorithm = %config.algorithm,
            bcrypt_cost = config.bcrypt_cost,
            access_token_ttl_secs = config.access_token_ttl.as_secs(),
            "security context initialized"
        );

        Ok(context)
    }

    /// Token codec.
    #[must_use]
    pub const fn tokens(&self) -> &AccessTokenCodec {
        &self.tokens
    }

    /// Password hasher.
    #[must_use]
    pub const fn passwords(&self) -> &PasswordHasher {
        &self.passwords
    }

    /// Issue a signed access token for `subject`, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_token(&self, subject: impl fmt::Display, ttl: Duration) -> Result<String, AuthError> {
        self.tokens.issue_token(subject, ttl)
    }

    /// Issue a signed access token with the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_default_token(&self, subject: impl fmt::Display) -> Result<String, AuthError> {
        self.tokens.issue_default_token(subject)
    }

    /// Decode and validate a presented token.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidToken`] whatever the reason for rejection.
    pub fn decode_token(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.tokens.decode_token(token)
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if bcrypt fails internally.
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.passwords.hash_password(password)
    }

    /// Check a password against a stored hash.
    #[must_use]
    pub fn verify_password(&self, password: &str, hashed: &str) -> bool {
        self.passwords.verify_password(password, hashed)
    }

    /// Whether a stored hash was made with different parameters.
    #[must_use]
    pub fn needs_rehash(&self, hashed: &str) -> bool {
        self.passwords.needs_rehash(hashed)
    }
}

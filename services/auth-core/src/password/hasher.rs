//! bcrypt password hashing.

use crate::config::{SecurityConfig, MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::error::AuthError;
use crate::metrics::{self, PasswordCheck};
use bcrypt::HashParts;
use tracing::warn;

/// Number of password bytes bcrypt actually consumes.
///
/// Anything past this is silently ignored, so two passwords sharing their
/// first 72 bytes hash and verify identically.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies passwords at a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Hasher using the configured bcrypt cost.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the cost is outside what bcrypt accepts.
    pub fn new(config: &SecurityConfig) -> Result<Self, AuthError> {
        let cost = config.bcrypt_cost;
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
            return Err(AuthError::config(format!("Invalid bcrypt cost: {cost}")));
        }
        Ok(Self { cost })
    }

    /// Work factor used for new hashes.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash `password` with a fresh random salt.
    ///
    /// Only the first [`MAX_PASSWORD_BYTES`] bytes take part in the hash.
    ///
    /// # Errors
    ///
    /// Returns an error only if bcrypt itself fails (salt generation).
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Check `password` against a stored hash.
    ///
    /// A stored hash that is not valid bcrypt never matches.
    #[must_use]
    pub fn verify_password(&self, password: &str, hashed: &str) -> bool {
        match bcrypt::verify(password, hashed) {
            Ok(matched) => {
                metrics::record_password_verification(if matched {
                    PasswordCheck::Match
                } else {
                    PasswordCheck::Mismatch
                });
                matched
            }
            Err(e) => {
                metrics::record_password_verification(PasswordCheck::Malformed);
                warn!(error = %e, "stored password hash is malformed");
                false
            }
        }
    }

    /// Whether a stored hash should be replaced after the next successful login.
    #[must_use]
    pub fn needs_rehash(&self, hashed: &str) -> bool {
        hashed
            .parse::<HashParts>()
            .map_or(true, |parts| parts.get_cost() != self.cost)
    }
}

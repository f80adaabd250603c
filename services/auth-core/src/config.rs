//! Security configuration for token signing and password hashing.
//!
//! Loaded once at startup from environment variables and validated before
//! any key material is built. The resulting [`SecurityConfig`] is immutable.

use crate::error::AuthError;
use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default access token lifetime: 8 days.
pub const DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES: u64 = 60 * 24 * 8;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

/// Lowest bcrypt cost accepted.
pub const MIN_BCRYPT_COST: u32 = 4;

/// Highest bcrypt cost accepted.
pub const MAX_BCRYPT_COST: u32 = 31;

/// Largest clock skew tolerated when checking `exp`, in seconds.
pub const MAX_LEEWAY_SECONDS: u64 = 300;

/// JWT signing algorithm. Only symmetric HMAC variants are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JwtAlgorithm {
    /// HMAC with SHA-256
    #[default]
    HS256,
    /// HMAC with SHA-384
    HS384,
    /// HMAC with SHA-512
    HS512,
}

impl JwtAlgorithm {
    /// Get algorithm name for JWT header.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::HS256 => "HS256",
            Self::HS384 => "HS384",
            Self::HS512 => "HS512",
        }
    }

    /// The matching `jsonwebtoken` algorithm.
    #[must_use]
    pub const fn to_jsonwebtoken(self) -> jsonwebtoken::Algorithm {
        match self {
            Self::HS256 => jsonwebtoken::Algorithm::HS256,
            Self::HS384 => jsonwebtoken::Algorithm::HS384,
            Self::HS512 => jsonwebtoken::Algorithm::HS512,
        }
    }
}

impl FromStr for JwtAlgorithm {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "HS256" => Ok(Self::HS256),
            "HS384" => Ok(Self::HS384),
            "HS512" => Ok(Self::HS512),
            _ => Err(AuthError::config(format!("Invalid JWT algorithm: {s}"))),
        }
    }
}

impl fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signing key, algorithm and hashing parameters.
#[derive(Clone)]
pub struct SecurityConfig {
    /// Symmetric signing key
    pub secret_key: SecretString,
    /// JWT signing algorithm
    pub algorithm: JwtAlgorithm,
    /// Lifetime used when the caller does not pick one
    pub access_token_ttl: Duration,
    /// bcrypt work factor for new hashes
    pub bcrypt_cost: u32,
    /// Clock skew tolerated when checking `exp`
    pub leeway: Duration,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .field("access_token_ttl", &self.access_token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl SecurityConfig {
    /// Create a configuration with defaults around the given signing key.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::from(secret_key.into()),
            algorithm: JwtAlgorithm::default(),
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES * 60),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            leeway: Duration::ZERO,
        }
    }

    /// Set the signing algorithm.
    #[must_use]
    pub const fn with_algorithm(mut self, algorithm: JwtAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the default access token lifetime.
    #[must_use]
    pub const fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Set the bcrypt cost.
    #[must_use]
    pub const fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Set the expiry leeway.
    #[must_use]
    pub const fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    ///
    /// # Errors
    ///
    /// Returns an error if `SECRET_KEY` is missing or any value is invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `SECRET_KEY` is missing or any value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret_key = lookup("SECRET_KEY")
            .ok_or_else(|| AuthError::config("SECRET_KEY is required"))?;

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(value) => value.parse::<JwtAlgorithm>()?,
            None => JwtAlgorithm::default(),
        };
        let ttl_minutes: u64 = parse_env(
            &lookup,
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            DEFAULT_ACCESS_TOKEN_EXPIRE_MINUTES,
        )?;
        let bcrypt_cost = parse_env(&lookup, "BCRYPT_COST", DEFAULT_BCRYPT_COST)?;
        let leeway_secs: u64 = parse_env(&lookup, "JWT_LEEWAY_SECONDS", 0)?;

        let config = Self::new(secret_key)
            .with_algorithm(algorithm)
            .with_access_token_ttl(Duration::from_secs(ttl_minutes.saturating_mul(60)))
            .with_bcrypt_cost(bcrypt_cost)
            .with_leeway(Duration::from_secs(leeway_secs));

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first rule the configuration breaks.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(AuthError::config("SECRET_KEY must not be empty"));
        }
        if self.access_token_ttl.is_zero() {
            return Err(AuthError::config(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be greater than 0",
            ));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(AuthError::config(format!(
                "BCRYPT_COST must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {}",
                self.bcrypt_cost
            )));
        }
        self.leeway_secs()?;
        Ok(())
    }

    /// Leeway in whole seconds, bounded by [`MAX_LEEWAY_SECONDS`].
    pub(crate) fn leeway_secs(&self) -> Result<i64, AuthError> {
        let secs = self.leeway.as_secs();
        if secs > MAX_LEEWAY_SECONDS {
            return Err(AuthError::config(format!(
                "JWT_LEEWAY_SECONDS must be at most {MAX_LEEWAY_SECONDS}, got {secs}"
            )));
        }
        i64::try_from(secs).map_err(|_| AuthError::config("JWT_LEEWAY_SECONDS out of range"))
    }
}

/// Parse a variable with a default when unset.
fn parse_env<T, F>(lookup: &F, name: &str, default: T) -> Result<T, AuthError>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse()
            .map_err(|e| AuthError::config(format!("Invalid {name}: {e}"))),
        None => Ok(default),
    }
}

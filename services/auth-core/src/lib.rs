//! Access token and password credential helpers.
//!
//! Issues HMAC-signed, time-limited access tokens for a subject, validates
//! presented tokens behind a single uniform failure signal, and hashes and
//! verifies passwords with bcrypt. User storage and HTTP routing live with
//! the caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod jwt;
pub mod metrics;
pub mod password;
pub mod security;
pub mod tracing_config;

// Re-exports for convenience
pub use config::{JwtAlgorithm, SecurityConfig};
pub use error::{AuthError, InvalidToken};
pub use jwt::{AccessTokenCodec, Claims};
pub use password::PasswordHasher;
pub use security::SecurityContext;

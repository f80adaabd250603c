//! Prometheus metrics for token and password operations.
//!
//! Token validation outcomes are only ever labelled valid/invalid.

use once_cell::sync::Lazy;
use prometheus::{register_counter_vec, CounterVec};

/// Tokens issued counter.
pub static TOKENS_ISSUED: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_tokens_issued_total",
        "Total number of access tokens issued",
        &["algorithm"]
    )
    .expect("Failed to register tokens_issued metric")
});

/// Token validations counter.
pub static TOKEN_VALIDATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_token_validations_total",
        "Total number of access token validations",
        &["status"]
    )
    .expect("Failed to register token_validations metric")
});

/// Password verifications counter.
pub static PASSWORD_VERIFICATIONS: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "auth_core_password_verifications_total",
        "Total number of password verifications",
        &["status"]
    )
    .expect("Failed to register password_verifications metric")
});

/// Outcome of a password verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    /// Password matched the stored hash
    Match,
    /// Password did not match
    Mismatch,
    /// Stored hash could not be parsed
    Malformed,
}

impl PasswordCheck {
    /// Label value.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Mismatch => "mismatch",
            Self::Malformed => "malformed",
        }
    }
}

/// Record a token issuance.
pub fn record_token_issued(algorithm: &str) {
    TOKENS_ISSUED.with_label_values(&[algorithm]).inc();
}

/// Record a token validation.
pub fn record_token_validation(valid: bool) {
    let status = if valid { "valid" } else { "invalid" };
    TOKEN_VALIDATIONS.with_label_values(&[status]).inc();
}

/// Record a password verification.
pub fn record_password_verification(check: PasswordCheck) {
    PASSWORD_VERIFICATIONS
        .with_label_values(&[check.as_str()])
        .inc();
}

//! Access token issuance and validation.

use crate::config::{JwtAlgorithm, SecurityConfig};
use crate::error::{AuthError, InvalidToken};
use crate::jwt::claims::Claims;
use crate::metrics;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Signs and verifies access tokens with one symmetric key.
///
/// Built once from [`SecurityConfig`]; holds no mutable state.
pub struct AccessTokenCodec {
    algorithm: JwtAlgorithm,
    default_ttl: Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    leeway: chrono::Duration,
}

impl AccessTokenCodec {
    /// Build the keys and validation rules.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the signing key is empty or the
    /// leeway is above [`MAX_LEEWAY_SECONDS`](crate::config::MAX_LEEWAY_SECONDS).
    pub fn new(config: &SecurityConfig) -> Result<Self, AuthError> {
        let secret = config.secret_key.expose_secret().as_bytes();
        if secret.is_empty() {
            return Err(AuthError::config("SECRET_KEY must not be empty"));
        }
        let leeway_secs = config.leeway_secs()?;

        // Pinned to the configured algorithm; exp is always checked.
        let mut validation = Validation::new(config.algorithm.to_jsonwebtoken());
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = config.leeway.as_secs();

        Ok(Self {
            algorithm: config.algorithm,
            default_ttl: config.access_token_ttl,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            leeway: chrono::Duration::seconds(leeway_secs),
        })
    }

    /// Algorithm tokens are signed with.
    #[must_use]
    pub const fn algorithm(&self) -> JwtAlgorithm {
        self.algorithm
    }

    /// Lifetime used by [`Self::issue_default_token`].
    #[must_use]
    pub const fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry is out of range or signing fails.
    pub fn issue_token(&self, subject: impl fmt::Display, ttl: Duration) -> Result<String, AuthError> {
        self.issue_token_at(subject, ttl, Utc::now())
    }

    /// Issue a token with the configured default lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if signing fails.
    pub fn issue_default_token(&self, subject: impl fmt::Display) -> Result<String, AuthError> {
        self.issue_token(subject, self.default_ttl)
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry is out of range or signing fails.
    pub fn issue_token_at(
        &self,
        subject: impl fmt::Display,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| AuthError::encoding("token lifetime out of range"))?;

        let claims = Claims::new(subject.to_string(), expires_at);
        let token = encode(
            &Header::new(self.algorithm.to_jsonwebtoken()),
            &claims,
            &self.encoding_key,
        )?;

        metrics::record_token_issued(self.algorithm.as_str());
        debug!(sub = %claims.sub, exp = claims.exp, "access token issued");

        Ok(token)
    }

    /// Verify signature, algorithm and expiry, returning the claims.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidToken`] for every kind of rejection.
    pub fn decode_token(&self, token: &str) -> Result<Claims, InvalidToken> {
        match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            // jsonwebtoken still accepts a token in the second its exp names
            Ok(data) if data.claims.is_expired_at(Utc::now() - self.leeway) => {
                metrics::record_token_validation(false);
                debug!(reason = "expired", "access token rejected");
                Err(InvalidToken)
            }
            Ok(data) => {
                metrics::record_token_validation(true);
                Ok(data.claims)
            }
            Err(e) => {
                metrics::record_token_validation(false);
                debug!(reason = ?e.kind(), "access token rejected");
                Err(InvalidToken)
            }
        }
    }
}

impl fmt::Debug for AccessTokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenCodec")
            .field("algorithm", &self.algorithm)
            .field("default_ttl", &self.default_ttl)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-only";

    fn codec() -> AccessTokenCodec {
        AccessTokenCodec::new(&SecurityConfig::new(SECRET)).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let codec = codec();

        let token = codec.issue_token("user-123", Duration::from_secs(900)).unwrap();
        let claims = codec.decode_token(&token).unwrap();

        assert_eq!(claims.sub, "user-123");
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_numeric_subject_is_stringified() {
        let codec = codec();

        let token = codec.issue_token(42_u64, Duration::from_secs(60)).unwrap();

        assert_eq!(codec.decode_token(&token).unwrap().sub, "42");
    }

    #[test]
    fn test_expiry_is_issue_time_plus_ttl() {
        let codec = codec();
        let now = Utc::now();

        let token = codec
            .issue_token_at("user-123", Duration::from_secs(3600), now)
            .unwrap();
        let claims = codec.decode_token(&token).unwrap();

        assert_eq!(claims.exp, now.timestamp() + 3600);
    }

    #[test]
    fn test_default_ttl() {
        let config = SecurityConfig::new(SECRET).with_access_token_ttl(Duration::from_secs(120));
        let codec = AccessTokenCodec::new(&config).unwrap();
        let before = Utc::now().timestamp();

        let token = codec.issue_default_token("user-123").unwrap();
        let claims = codec.decode_token(&token).unwrap();

        assert!(claims.exp >= before + 120);
        assert!(claims.exp <= Utc::now().timestamp() + 120);
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        // 20 minutes ago so a 15-minute token is expired
        let issued = Utc::now() - chrono::Duration::minutes(20);

        let token = codec
            .issue_token_at("user-123", Duration::from_secs(15 * 60), issued)
            .unwrap();

        assert_eq!(codec.decode_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_leeway_accepts_recently_expired() {
        let config = SecurityConfig::new(SECRET).with_leeway(Duration::from_secs(300));
        let codec = AccessTokenCodec::new(&config).unwrap();
        let issued = Utc::now() - chrono::Duration::minutes(2);

        let token = codec
            .issue_token_at("user-123", Duration::from_secs(60), issued)
            .unwrap();

        assert!(codec.decode_token(&token).is_ok());
    }

    #[test]
    fn test_token_invalid_in_its_expiry_second() {
        let codec = codec();
        let now = Utc::now();

        let token = codec
            .issue_token_at("alice", Duration::from_secs(1), now - chrono::Duration::seconds(1))
            .unwrap();

        assert_eq!(codec.decode_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_token_invalid_just_past_lifetime() {
        let codec = codec();
        let issued = Utc::now() - chrono::Duration::milliseconds(1_050);

        let token = codec
            .issue_token_at("alice", Duration::from_secs(1), issued)
            .unwrap();

        assert_eq!(codec.decode_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_leeway_covers_expiry_second() {
        let config = SecurityConfig::new(SECRET).with_leeway(Duration::from_secs(5));
        let codec = AccessTokenCodec::new(&config).unwrap();

        let token = codec
            .issue_token_at("alice", Duration::from_secs(1), Utc::now() - chrono::Duration::seconds(1))
            .unwrap();

        assert!(codec.decode_token(&token).is_ok());
    }

    #[test]
    fn test_excessive_leeway_rejected() {
        let config = SecurityConfig::new(SECRET).with_leeway(Duration::from_secs(u64::MAX));

        assert!(matches!(
            AccessTokenCodec::new(&config),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_bad_signature() {
        let codec_a = AccessTokenCodec::new(&SecurityConfig::new("secret-A")).unwrap();
        let codec_b = AccessTokenCodec::new(&SecurityConfig::new("secret-B")).unwrap();

        let token = codec_a.issue_token("user-123", Duration::from_secs(60)).unwrap();

        assert_eq!(codec_b.decode_token(&token), Err(InvalidToken));
    }

    #[test]
    fn test_algorithm_is_pinned() {
        let hs512 = AccessTokenCodec::new(
            &SecurityConfig::new(SECRET).with_algorithm(JwtAlgorithm::HS512),
        )
        .unwrap();

        let token = hs512.issue_token("user-123", Duration::from_secs(60)).unwrap();

        assert_eq!(codec().decode_token(&token), Err(InvalidToken));
        assert!(hs512.decode_token(&token).is_ok());
    }

    #[test]
    fn test_garbage_is_invalid() {
        let codec = codec();

        for token in ["not-a-token", "", "a.b.c", "header.payload"] {
            assert_eq!(codec.decode_token(token), Err(InvalidToken), "{token}");
        }
    }

    #[test]
    fn test_empty_secret_rejected() {
        let config = SecurityConfig::new("");
        assert!(matches!(
            AccessTokenCodec::new(&config),
            Err(AuthError::Config(_))
        ));
    }

    #[test]
    fn test_debug_omits_keys() {
        let debug = format!("{:?}", codec());
        assert!(!debug.contains(SECRET));
        assert!(debug.contains("HS256"));
    }
}

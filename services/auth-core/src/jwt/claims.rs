use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Access token payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Expiry (seconds since epoch, UTC)
    pub exp: i64,
    /// Subject the token was issued for
    pub sub: String,
    /// Any other claims present in a decoded token
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Claims for `subject` expiring at `expires_at`.
    pub fn new(subject: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            exp: expires_at.timestamp(),
            sub: subject.into(),
            extra: HashMap::new(),
        }
    }

    /// Expiry as a timestamp.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// Whether the token has expired at `now`. A token is no longer valid
    /// in the second its `exp` names.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Whether the token has expired now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_claims_creation() {
        let now = Utc::now();
        let claims = Claims::new("user-123", now + Duration::minutes(15));

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.exp, (now + Duration::minutes(15)).timestamp());
        assert!(!claims.is_expired());
        assert!(claims.extra.is_empty());
    }

    #[test]
    fn test_claims_expiry_boundary() {
        let now = Utc::now();
        let claims = Claims::new("user-123", now);

        assert!(!claims.is_expired_at(now - Duration::seconds(1)));
        assert!(claims.is_expired_at(now));
        assert!(claims.is_expired_at(now + Duration::seconds(1)));
    }

    #[test]
    fn test_claims_wire_shape() {
        let claims = Claims {
            exp: 1_700_000_000,
            sub: "42".to_string(),
            extra: HashMap::new(),
        };
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json, serde_json::json!({"exp": 1_700_000_000, "sub": "42"}));
    }

    #[test]
    fn test_claims_keep_foreign_fields() {
        let json = r#"{"exp": 1700000000, "sub": "abc", "scope": "admin"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();

        assert_eq!(claims.sub, "abc");
        assert_eq!(claims.extra.get("scope"), Some(&serde_json::json!("admin")));
    }
}

//! Access token issuing and validation
//!
//! Tokens are HS256-signed JWTs carrying caller-supplied claims plus an
//! `exp` timestamp. Validation uses zero leeway.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

/// Default token lifetime
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60 * 24;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Errors that can occur while issuing a token
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signing or encoding failed
    #[error("Failed to encode token: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Caller-supplied claims
    #[serde(flatten)]
    pub data: Map<String, Value>,
    /// Expiry (seconds since the Unix epoch)
    pub exp: i64,
}

impl Claims {
    /// String-valued claim, if present
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Issues and validates signed, time-limited access tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Create a service signing with `secret`, issuing tokens valid for `ttl_minutes`
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::minutes(ttl_minutes),
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `claims`, expiring `ttl` from now.
    ///
    /// A caller-supplied `exp` is replaced.
    pub fn issue_token(&self, claims: Map<String, Value>) -> Result<String, TokenError> {
        self.issue_token_at(claims, Utc::now())
    }

    /// Issue a token as if the current time were `issued_at`
    pub fn issue_token_at(
        &self,
        mut claims: Map<String, Value>,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        claims.remove("exp");
        let payload = Claims {
            data: claims,
            exp: (issued_at + self.ttl).timestamp(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(ALGORITHM),
            &payload,
            &self.encoding_key,
        )?)
    }

    /// Validate signature and expiry and return the claims.
    ///
    /// Every failure (tampered, malformed, expired) is reported through
    /// `on_failure`; the cause is only logged.
    pub fn verify_token<E, F>(&self, token: &str, on_failure: F) -> Result<Claims, E>
    where
        F: FnOnce() -> E,
    {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                debug!(reason = ?e.kind(), "Rejected access token");
                Err(on_failure())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims() -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("sub".to_string(), json!("kim"));
        map.insert("role".to_string(), json!("staff"));
        map
    }

    #[test]
    fn test_issue_then_verify_returns_claims() {
        let service = TokenService::new("secret", DEFAULT_TOKEN_TTL_MINUTES);
        let token = service.issue_token(claims()).unwrap();

        let decoded = service.verify_token(&token, || "invalid").unwrap();
        assert_eq!(decoded.data, claims());
        assert_eq!(decoded.get_str("sub"), Some("kim"));

        let expected_exp = (Utc::now() + Duration::hours(24)).timestamp();
        assert!((decoded.exp - expected_exp).abs() <= 5);
    }

    #[test]
    fn test_expired_token_takes_failure_path() {
        let service = TokenService::new("secret", DEFAULT_TOKEN_TTL_MINUTES);
        let issued_at = Utc::now() - Duration::hours(24) - Duration::minutes(1);
        let token = service.issue_token_at(claims(), issued_at).unwrap();

        let result = service.verify_token(&token, || "invalid");
        assert_eq!(result, Err("invalid"));
    }

    #[test]
    fn test_wrong_secret_takes_failure_path() {
        let issuer = TokenService::new("secret-a", DEFAULT_TOKEN_TTL_MINUTES);
        let verifier = TokenService::new("secret-b", DEFAULT_TOKEN_TTL_MINUTES);
        let token = issuer.issue_token(claims()).unwrap();

        assert!(verifier.verify_token(&token, || ()).is_err());
    }

    #[test]
    fn test_malformed_and_tampered_tokens() {
        let service = TokenService::new("secret", DEFAULT_TOKEN_TTL_MINUTES);
        assert!(service.verify_token("not.a.jwt", || ()).is_err());
        assert!(service.verify_token("", || ()).is_err());

        let token = service.issue_token(claims()).unwrap();
        let mut escalated = claims();
        escalated.insert("role".to_string(), json!("admin"));
        let forged = service.issue_token(escalated).unwrap();

        let original: Vec<&str> = token.split('.').collect();
        let forged: Vec<&str> = forged.split('.').collect();
        let tampered = format!("{}.{}.{}", original[0], forged[1], original[2]);
        // Payload swapped under the original signature
        assert!(service.verify_token(&tampered, || ()).is_err());
    }

    #[test]
    fn test_caller_exp_is_overwritten() {
        let service = TokenService::new("secret", 10);
        let mut map = claims();
        map.insert("exp".to_string(), json!(1));
        let token = service.issue_token(map).unwrap();

        let decoded = service.verify_token(&token, || ()).unwrap();
        assert!(decoded.exp > Utc::now().timestamp());
        assert!(!decoded.data.contains_key("exp"));
    }
}

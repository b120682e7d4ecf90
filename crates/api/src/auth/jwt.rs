//! JWT session token generation and validation

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Session token lifetime. Fixed by design; there is no refresh flow.
pub const TOKEN_TTL: Duration = Duration::hours(1);

/// Clock skew tolerance in seconds for expiry checks
const LEEWAY_SECS: u64 = 30;

/// JWT claims structure for Cradle session tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: Uuid,
    /// Email
    pub email: String,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
}

/// JWT manager for token operations
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    /// Create a new JWT manager
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issue a session token for a logged-in or freshly verified user
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TOKEN_TTL;

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };

        // Explicit algorithm prevents algorithm confusion attacks
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Encoding(e.to_string()))
    }

    /// Validate and decode a session token
    ///
    /// Bad signature, malformed structure and expiry all collapse into the
    /// same error kind; callers must not be able to tell why a token failed.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = LEEWAY_SECS;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| JwtError::Invalid)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> JwtManager {
        JwtManager::new("test-secret-key-at-least-32-chars!!")
    }

    /// Encode claims with arbitrary timestamps, bypassing `issue`
    fn encode_raw(jwt: &JwtManager, user_id: Uuid, iat: i64, exp: i64) -> String {
        let claims = Claims {
            sub: user_id,
            email: "test@example.com".to_string(),
            iat,
            exp,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &jwt.encoding_key).unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let jwt = manager();
        let user_id = Uuid::new_v4();

        let token = jwt.issue(user_id, "test@example.com").unwrap();
        let claims = jwt.verify(&token).expect("Fresh token should verify");

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL.whole_seconds());
    }

    #[test]
    fn test_token_valid_just_before_expiry() {
        let jwt = manager();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        // Issued 59 minutes ago with a 1 hour lifetime
        let token = encode_raw(&jwt, Uuid::new_v4(), now - 59 * 60, now + 60);
        assert!(jwt.verify(&token).is_ok());
    }

    #[test]
    fn test_token_rejected_after_expiry() {
        let jwt = manager();
        let now = OffsetDateTime::now_utc().unix_timestamp();

        // Expired a minute ago, beyond the clock skew tolerance
        let token = encode_raw(&jwt, Uuid::new_v4(), now - 61 * 60, now - 60);
        assert!(matches!(jwt.verify(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_truncated_token_rejected() {
        let jwt = manager();
        let token = jwt.issue(Uuid::new_v4(), "test@example.com").unwrap();

        let truncated = &token[..token.len() - 1];
        assert!(matches!(jwt.verify(truncated), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let jwt = manager();
        let other = JwtManager::new("another-secret-key-also-32-chars!!!");

        let token = jwt.issue(Uuid::new_v4(), "test@example.com").unwrap();
        assert!(matches!(other.verify(&token), Err(JwtError::Invalid)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let jwt = manager();
        assert!(matches!(jwt.verify("not.a.jwt"), Err(JwtError::Invalid)));
        assert!(matches!(jwt.verify(""), Err(JwtError::Invalid)));
    }
}

//! Session tokens
//!
//! A logged-in user carries an HS256-signed JWT, normally in the
//! `thoughts_session` cookie. The token is the whole session: there is no
//! server-side session table.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::MIN_SECRET_LEN;
use crate::types::{ThoughtsError, User, UserId};

/// Payload stored in the session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id (hex ObjectId)
    pub sub: String,
    /// First name, shown on the dashboard
    pub name: String,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    pub fn user_id(&self) -> Option<UserId> {
        self.sub.parse().ok()
    }
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    expiry_seconds: u64,
}

impl SessionKeys {
    /// Returns an error if the secret is too short
    pub fn new(secret: String, expiry_seconds: u64) -> Result<Self, ThoughtsError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(ThoughtsError::Config(format!(
                "Session secret must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }

        Ok(Self {
            secret,
            expiry_seconds,
        })
    }

    pub fn expiry_seconds(&self) -> u64 {
        self.expiry_seconds
    }

    /// Issue a token for `user`
    pub fn issue(&self, user: &User) -> Result<String, ThoughtsError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ThoughtsError::Auth(format!("System time error: {}", e)))?
            .as_secs();

        let claims = Claims {
            sub: user.id.to_hex(),
            name: user.first_name.clone(),
            iat: now,
            exp: now + self.expiry_seconds,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ThoughtsError::Auth(format!("Failed to issue session token: {}", e)))
    }

    /// Verify a token, returning its claims
    pub fn verify(&self, token: &str) -> Result<Claims, ThoughtsError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

/// Extract token from an Authorization header ("Bearer <token>")
pub fn extract_bearer(auth_header: Option<&str>) -> Option<&str> {
    let token = auth_header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn keys() -> SessionKeys {
        SessionKeys::new("test-secret-that-is-at-least-32-characters-long".into(), 3600).unwrap()
    }

    fn user() -> User {
        User {
            id: UserId::new(),
            google_id: "g-1".into(),
            display_name: "Ada Lovelace".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let keys = keys();
        let user = user();
        let token = keys.issue(&user).unwrap();

        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.user_id(), Some(user.id));
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = keys().issue(&user()).unwrap();
        let other =
            SessionKeys::new("different-secret-that-is-at-least-32-characters".into(), 3600)
                .unwrap();
        assert!(other.verify(&token).is_err());
        assert!(keys().verify("garbage").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = keys();
        let claims = Claims {
            sub: UserId::new().to_hex(),
            name: "Old".into(),
            iat: 1_000,
            exp: 2_000,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret-that-is-at-least-32-characters-long"),
        )
        .unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(SessionKeys::new("short".into(), 3600).is_err());
    }

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer(Some("Bearer abc123")), Some("abc123"));
        assert_eq!(extract_bearer(Some("Bearer ")), None);
        assert_eq!(extract_bearer(Some("Basic abc123")), None);
        assert_eq!(extract_bearer(None), None);
    }
}

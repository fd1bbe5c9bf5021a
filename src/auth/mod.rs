//! Authentication for Thoughts
//!
//! Provides:
//! - Session tokens (HS256 JWT) and the cookie that carries them
//! - The per-request authenticator that turns a request into a `UserId`
//! - The Google OAuth 2.0 login client

pub mod cookies;
pub mod google;
pub mod session;

use hyper::header::{HeaderMap, AUTHORIZATION};
use tracing::debug;

pub use cookies::{clear_cookie, get_cookie, set_cookie, OAUTH_STATE_COOKIE, SESSION_COOKIE};
pub use google::{generate_state, GoogleOAuth};
pub use session::{extract_bearer, Claims, SessionKeys};

use crate::types::UserId;

/// The authenticated requester
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: UserId,
    pub first_name: String,
}

/// Resolves the requester from session cookie or bearer token
#[derive(Clone)]
pub struct Authenticator {
    keys: SessionKeys,
}

impl Authenticator {
    pub fn new(keys: SessionKeys) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// `None` means unauthenticated; bad or expired tokens are not errors
    pub fn current_user(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = get_cookie(headers, SESSION_COOKIE).or_else(|| {
            extract_bearer(headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()))
        })?;

        match self.keys.verify(token) {
            Ok(claims) => {
                let user_id = claims.user_id()?;
                Some(Identity {
                    user_id,
                    first_name: claims.name,
                })
            }
            Err(e) => {
                debug!("Ignoring invalid session token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::User;
    use chrono::Utc;
    use hyper::header::{HeaderValue, COOKIE};

    fn setup() -> (Authenticator, User, String) {
        let keys =
            SessionKeys::new("test-secret-that-is-at-least-32-characters-long".into(), 60).unwrap();
        let user = User {
            id: UserId::new(),
            google_id: "g".into(),
            display_name: "Grace Hopper".into(),
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            image: None,
            created_at: Utc::now(),
        };
        let token = keys.issue(&user).unwrap();
        (Authenticator::new(keys), user, token)
    }

    #[test]
    fn test_cookie_session() {
        let (auth, user, token) = setup();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token)).unwrap(),
        );

        let identity = auth.current_user(&headers).unwrap();
        assert_eq!(identity.user_id, user.id);
        assert_eq!(identity.first_name, "Grace");
    }

    #[test]
    fn test_bearer_session() {
        let (auth, user, token) = setup();
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        assert_eq!(auth.current_user(&headers).unwrap().user_id, user.id);
    }

    #[test]
    fn test_unauthenticated() {
        let (auth, _, _) = setup();
        assert!(auth.current_user(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("thoughts_session=forged"));
        assert!(auth.current_user(&headers).is_none());
    }
}

//! Google OAuth 2.0 (authorization code flow)
//!
//! 1. `/auth/google` redirects to Google's consent screen with a random `state`
//! 2. Google redirects back to `/auth/google/callback?code=..&state=..`
//! 3. The code is exchanged for an access token, and the profile is fetched
//!    from the OpenID Connect userinfo endpoint

use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::config::GoogleArgs;
use crate::types::{ThoughtsError, UserProfile};

/// Scope requested from Google; the profile is all we need
const SCOPE: &str = "profile";

/// Token endpoint response (only the fields we use)
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OpenID Connect userinfo response
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

impl From<UserInfo> for UserProfile {
    fn from(info: UserInfo) -> Self {
        let first_name = info.given_name.unwrap_or_default();
        let last_name = info.family_name.unwrap_or_default();
        let display_name = info
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| format!("{} {}", first_name, last_name).trim().to_string());

        UserProfile {
            google_id: info.sub,
            display_name,
            first_name,
            last_name,
            image: info.picture,
        }
    }
}

/// Configured Google OAuth client
#[derive(Clone)]
pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    callback_url: String,
    auth_url: String,
    token_url: String,
    userinfo_url: String,
    http: reqwest::Client,
}

impl GoogleOAuth {
    /// `None` when client credentials are not configured
    pub fn from_args(args: &GoogleArgs) -> Option<Self> {
        if !args.is_configured() {
            return None;
        }

        Some(Self {
            client_id: args.google_client_id.clone()?,
            client_secret: args.google_client_secret.clone()?,
            callback_url: args.google_callback_url.clone(),
            auth_url: args.google_auth_url.clone(),
            token_url: args.google_token_url.clone(),
            userinfo_url: args.google_userinfo_url.clone(),
            http: reqwest::Client::new(),
        })
    }

    /// Consent screen URL carrying `state`
    pub fn authorize_url(&self, state: &str) -> String {
        let query = serde_urlencoded::to_string(&[
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.callback_url.as_str()),
            ("response_type", "code"),
            ("scope", SCOPE),
            ("state", state),
        ])
        .unwrap_or_default();

        format!(
            "{}{}{}",
            self.auth_url,
            if self.auth_url.contains('?') { "&" } else { "?" },
            query
        )
    }

    /// Exchange an authorization code and fetch the user's profile
    pub async fn fetch_profile(&self, code: &str) -> Result<UserProfile, ThoughtsError> {
        let token: TokenResponse = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("OAuth code exchanged for access token");

        let info: UserInfo = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if info.sub.is_empty() {
            return Err(ThoughtsError::OAuth("Userinfo response without subject".into()));
        }

        Ok(info.into())
    }
}

/// Random CSRF state for one OAuth round trip
pub fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> GoogleArgs {
        GoogleArgs {
            google_client_id: Some("client-123".into()),
            google_client_secret: Some("secret".into()),
            google_callback_url: "http://localhost:3000/auth/google/callback".into(),
            google_auth_url: "https://accounts.example.com/auth".into(),
            google_token_url: "https://accounts.example.com/token".into(),
            google_userinfo_url: "https://accounts.example.com/userinfo".into(),
        }
    }

    #[test]
    fn test_unconfigured_client_is_none() {
        let mut args = args();
        args.google_client_secret = None;
        assert!(GoogleOAuth::from_args(&args).is_none());
    }

    #[test]
    fn test_authorize_url() {
        let oauth = GoogleOAuth::from_args(&args()).unwrap();
        let url = oauth.authorize_url("abc");
        assert!(url.starts_with("https://accounts.example.com/auth?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fauth%2Fgoogle%2Fcallback"
        ));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=profile"));
        assert!(url.contains("state=abc"));
    }

    #[test]
    fn test_state_is_random_hex() {
        let a = generate_state();
        let b = generate_state();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_profile_from_userinfo() {
        let info: UserInfo = serde_json::from_str(
            r#"{"sub":"1089","given_name":"Ada","family_name":"Lovelace","picture":"https://img/a.png"}"#,
        )
        .unwrap();
        let profile = UserProfile::from(info);
        assert_eq!(profile.google_id, "1089");
        assert_eq!(profile.display_name, "Ada Lovelace");
        assert_eq!(profile.first_name, "Ada");
        assert_eq!(profile.image.as_deref(), Some("https://img/a.png"));
    }
}

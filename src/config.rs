//! Configuration for Thoughts
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Fallback session secret for dev mode only
const DEV_SESSION_SECRET: &str = "dev-only-insecure-session-secret-0123456789";

/// Minimum accepted session secret length outside dev mode
pub const MIN_SECRET_LEN: usize = 32;

/// Thoughts - share short thoughts, publicly or privately
#[derive(Parser, Debug, Clone)]
#[command(name = "thoughts")]
#[command(about = "Authenticated web app for public and private thoughts")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// Enable development mode (in-memory fallback store, dev login route)
    #[arg(long, env = "DEV_MODE", default_value = "false")]
    pub dev_mode: bool,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "thoughts")]
    pub mongodb_db: String,

    /// Secret for signing session tokens (required in production)
    #[arg(long, env = "SESSION_SECRET")]
    pub session_secret: Option<String>,

    /// Session lifetime in seconds
    #[arg(long, env = "SESSION_EXPIRY_SECONDS", default_value = "604800")]
    pub session_expiry_seconds: u64,

    /// Mark session cookies `Secure` (serve behind HTTPS)
    #[arg(long, env = "SECURE_COOKIES", default_value = "false")]
    pub secure_cookies: bool,

    /// Google OAuth client configuration
    #[command(flatten)]
    pub google: GoogleArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, env = "LOG_JSON", default_value = "false")]
    pub log_json: bool,
}

/// Google OAuth 2.0 client configuration
#[derive(Parser, Debug, Clone)]
pub struct GoogleArgs {
    /// OAuth client ID
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// OAuth client secret
    #[arg(long, env = "GOOGLE_CLIENT_SECRET")]
    pub google_client_secret: Option<String>,

    /// Redirect URI registered with Google
    #[arg(
        long,
        env = "GOOGLE_CALLBACK_URL",
        default_value = "http://localhost:3000/auth/google/callback"
    )]
    pub google_callback_url: String,

    /// Authorization endpoint
    #[arg(
        long,
        env = "GOOGLE_AUTH_URL",
        default_value = "https://accounts.google.com/o/oauth2/v2/auth"
    )]
    pub google_auth_url: String,

    /// Token endpoint
    #[arg(
        long,
        env = "GOOGLE_TOKEN_URL",
        default_value = "https://oauth2.googleapis.com/token"
    )]
    pub google_token_url: String,

    /// OpenID Connect userinfo endpoint
    #[arg(
        long,
        env = "GOOGLE_USERINFO_URL",
        default_value = "https://openidconnect.googleapis.com/v1/userinfo"
    )]
    pub google_userinfo_url: String,
}

impl GoogleArgs {
    /// OAuth login is available only with both client id and secret
    pub fn is_configured(&self) -> bool {
        matches!(
            (&self.google_client_id, &self.google_client_secret),
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty()
        )
    }
}

impl Args {
    /// Effective session secret (falls back to an insecure default in dev mode)
    pub fn session_secret(&self) -> Option<String> {
        match &self.session_secret {
            Some(secret) if !secret.is_empty() => Some(secret.clone()),
            _ if self.dev_mode => Some(DEV_SESSION_SECRET.to_string()),
            _ => None,
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !self.dev_mode {
            match &self.session_secret {
                None => return Err("SESSION_SECRET is required in production mode".into()),
                Some(secret) if secret.len() < MIN_SECRET_LEN => {
                    return Err(format!(
                        "SESSION_SECRET must be at least {} characters",
                        MIN_SECRET_LEN
                    ))
                }
                Some(_) => {}
            }
        }

        if self.session_expiry_seconds == 0 {
            return Err("SESSION_EXPIRY_SECONDS must be greater than zero".into());
        }

        if self.google.google_client_id.is_some() != self.google.google_client_secret.is_some() {
            return Err("GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set together".into());
        }

        Ok(())
    }
}

/// Parse argv with every environment fallback removed
#[cfg(test)]
pub(crate) fn args_from_argv(argv: &[&str]) -> Args {
    use clap::{CommandFactory, FromArgMatches};

    let matches = Args::command()
        .mut_args(|arg| arg.env(None::<&'static str>))
        .try_get_matches_from(argv)
        .unwrap();
    Args::from_arg_matches(&matches).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["thoughts"];
        argv.extend_from_slice(extra);
        args_from_argv(&argv)
    }

    #[test]
    fn test_environment_is_ignored_in_tests() {
        std::env::set_var("GOOGLE_TOKEN_URL", "http://elsewhere.invalid/token");
        let args = parse(&[]);
        std::env::remove_var("GOOGLE_TOKEN_URL");

        assert_eq!(args.google.google_token_url, "https://oauth2.googleapis.com/token");
        assert!(!args.dev_mode);
        assert!(args.session_secret.is_none());
    }

    #[test]
    fn test_dev_mode_needs_no_secret() {
        let args = parse(&["--dev-mode"]);
        assert!(args.validate().is_ok());
        assert_eq!(args.session_secret().as_deref(), Some(DEV_SESSION_SECRET));
    }

    #[test]
    fn test_production_requires_long_secret() {
        let args = parse(&["--session-secret", "short"]);
        assert!(args.validate().is_err());

        let args = parse(&["--session-secret", "a-production-secret-of-at-least-32-chars"]);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_google_credentials_come_in_pairs() {
        let args = parse(&["--dev-mode", "--google-client-id", "abc"]);
        assert!(args.validate().is_err());
        assert!(!args.google.is_configured());

        let args = parse(&[
            "--dev-mode",
            "--google-client-id",
            "abc",
            "--google-client-secret",
            "xyz",
        ]);
        assert!(args.validate().is_ok());
        assert!(args.google.is_configured());
    }
}

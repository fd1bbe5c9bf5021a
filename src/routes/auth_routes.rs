//! Login and logout routes under `/auth`

use hyper::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use super::{fault, RouteRequest};
use crate::auth::cookies::OAUTH_STATE_MAX_AGE;
use crate::auth::{
    clear_cookie, generate_state, get_cookie, set_cookie, OAUTH_STATE_COOKIE, SESSION_COOKIE,
};
use crate::render::{redirect, BoxBody};
use crate::server::AppState;
use crate::types::{User, UserProfile};

/// Prefix for `google_id` of users created by the dev login
pub const DEV_ACCOUNT_PREFIX: &str = "dev:";

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DevLoginQuery {
    name: Option<String>,
}

/// Cookie that establishes a session for `user`
fn session_cookie(state: &AppState, user: &User) -> crate::types::Result<String> {
    let keys = state.authenticator.keys();
    let token = keys.issue(user)?;
    Ok(set_cookie(
        SESSION_COOKIE,
        &token,
        keys.expiry_seconds(),
        state.args.secure_cookies,
    ))
}

/// GET /auth/google
pub fn google(state: &AppState, _req: &RouteRequest) -> Response<BoxBody> {
    let Some(oauth) = &state.google else {
        return state
            .renderer
            .render("login", json!({ "layout": "login", "oauth_enabled": false }));
    };

    let csrf = generate_state();
    let cookie = set_cookie(
        OAUTH_STATE_COOKIE,
        &csrf,
        OAUTH_STATE_MAX_AGE,
        state.args.secure_cookies,
    );
    redirect(&oauth.authorize_url(&csrf), &[cookie])
}

/// GET /auth/google/callback
pub async fn google_callback(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    let clear_state = clear_cookie(OAUTH_STATE_COOKIE);

    let Some(oauth) = &state.google else {
        return redirect("/", &[clear_state]);
    };

    let query: CallbackQuery = match req.parse_query() {
        Ok(query) => query,
        Err(e) => {
            warn!("Malformed OAuth callback: {}", e);
            return redirect("/", &[clear_state]);
        }
    };

    if let Some(error) = query.error {
        warn!("OAuth login refused by provider: {}", error);
        return redirect("/", &[clear_state]);
    }

    let expected = get_cookie(&req.headers, OAUTH_STATE_COOKIE);
    let (Some(code), Some(returned)) = (query.code, query.state) else {
        warn!("OAuth callback without code or state");
        return redirect("/", &[clear_state]);
    };
    if expected != Some(returned.as_str()) {
        warn!("OAuth state mismatch");
        return redirect("/", &[clear_state]);
    }

    let profile = match oauth.fetch_profile(&code).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("OAuth code exchange failed: {}", e);
            return redirect("/", &[clear_state]);
        }
    };

    let user = match state.lifecycle.users().upsert_profile(profile).await {
        Ok(user) => user,
        Err(e) => return fault(state, "Failed to store user", e),
    };

    match session_cookie(state, &user) {
        Ok(session) => {
            info!(user = %user.id, "User logged in");
            redirect("/dashboard", &[session, clear_state])
        }
        Err(e) => fault(state, "Failed to issue session", e),
    }
}

/// GET /auth/logout
pub fn logout(_state: &AppState) -> Response<BoxBody> {
    redirect("/", &[clear_cookie(SESSION_COOKIE)])
}

/// GET /auth/dev-login?name=
pub async fn dev_login(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    let name = req
        .parse_query::<DevLoginQuery>()
        .ok()
        .and_then(|q| q.name)
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Developer".to_string());

    let profile = UserProfile {
        google_id: format!("{}{}", DEV_ACCOUNT_PREFIX, name.to_lowercase()),
        display_name: name.clone(),
        first_name: name,
        last_name: String::new(),
        image: None,
    };

    let user = match state.lifecycle.users().upsert_profile(profile).await {
        Ok(user) => user,
        Err(e) => return fault(state, "Failed to store dev user", e),
    };

    match session_cookie(state, &user) {
        Ok(session) => {
            info!(user = %user.id, "Dev login");
            redirect("/dashboard", &[session])
        }
        Err(e) => fault(state, "Failed to issue session", e),
    }
}

//! Top-level pages: login, about, dashboard

use hyper::Response;
use serde_json::json;

use super::{fault, require_user, RouteRequest};
use crate::render::{redirect, BoxBody};
use crate::server::AppState;

/// GET / (guests only)
pub fn login(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    if state.authenticator.current_user(&req.headers).is_some() {
        return redirect("/dashboard", &[]);
    }
    state.renderer.render(
        "login",
        json!({ "layout": "login", "oauth_enabled": state.google.is_some() }),
    )
}

/// GET /about
pub fn about(state: &AppState) -> Response<BoxBody> {
    state.renderer.render("about", serde_json::Value::Null)
}

/// GET /dashboard
pub async fn dashboard(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    let identity = match require_user(state, req) {
        Ok(identity) => identity,
        Err(response) => return response,
    };

    match state.lifecycle.list_own(identity.user_id).await {
        Ok(thoughts) => state.renderer.render(
            "dashboard",
            json!({ "name": identity.first_name, "thoughts": thoughts }),
        ),
        Err(e) => fault(state, "Failed to load dashboard", e),
    }
}

//! Thought routes under `/thoughts`
//!
//! Every handler requires a session. Malformed ids behave like missing
//! records; denials on writes send the user back to `/thoughts`.

use hyper::Response;
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::{bad_request, error_response, fault, require_user, RouteRequest};
use crate::lifecycle::Access;
use crate::render::{redirect, BoxBody, ErrorPage};
use crate::server::AppState;
use crate::types::{Status, ThoughtId, ThoughtPatch, UserId};

/// Fields accepted from the add and edit forms
#[derive(Debug, Default, Deserialize)]
struct ThoughtForm {
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl ThoughtForm {
    fn status(&self) -> Result<Option<Status>, String> {
        self.status
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .transpose()
    }
}

macro_rules! authenticated {
    ($state:expr, $req:expr) => {
        match require_user($state, $req) {
            Ok(identity) => identity,
            Err(response) => return response,
        }
    };
}

/// GET /thoughts/add
pub fn add_form(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    let _identity = authenticated!(state, req);
    state.renderer.render("thoughts/add", serde_json::Value::Null)
}

/// POST /thoughts
pub async fn create(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    let identity = authenticated!(state, req);

    let form: ThoughtForm = match req.parse_body() {
        Ok(form) => form,
        Err(e) => return error_response(&e),
    };
    let status = match form.status() {
        Ok(status) => status.unwrap_or_default(),
        Err(e) => return bad_request(&e),
    };
    let body = match form.body {
        Some(body) if !body.trim().is_empty() => body,
        _ => return bad_request("Thought body is required"),
    };

    match state.lifecycle.create(identity.user_id, body, status).await {
        Ok(_) => redirect("/dashboard", &[]),
        Err(e) => fault(state, "Failed to create thought", e),
    }
}

/// GET /thoughts
pub async fn index(state: &AppState, req: &RouteRequest) -> Response<BoxBody> {
    let identity = authenticated!(state, req);

    match state.lifecycle.list_public(identity.user_id).await {
        Ok(thoughts) => state
            .renderer
            .render("thoughts/index", json!({ "thoughts": thoughts })),
        Err(e) => fault(state, "Failed to list public thoughts", e),
    }
}

/// GET /thoughts/{id}
pub async fn show(state: &AppState, req: &RouteRequest, id: &str) -> Response<BoxBody> {
    let identity = authenticated!(state, req);
    let Ok(id) = id.parse::<ThoughtId>() else {
        return state.renderer.error_page(ErrorPage::NotFound);
    };

    match state.lifecycle.get(identity.user_id, id).await {
        Ok(Access::Granted(view)) => state
            .renderer
            .render("thoughts/show", json!({ "thought": view })),
        // Hide the existence of other users' private thoughts
        Ok(Access::Denied) | Ok(Access::NotFound) => state.renderer.error_page(ErrorPage::NotFound),
        Err(e) => fault(state, "Failed to load thought", e),
    }
}

/// GET /thoughts/edit/{id}
pub async fn edit_form(state: &AppState, req: &RouteRequest, id: &str) -> Response<BoxBody> {
    let identity = authenticated!(state, req);
    let Ok(id) = id.parse::<ThoughtId>() else {
        return state.renderer.error_page(ErrorPage::NotFound);
    };

    match state.lifecycle.get_for_edit(identity.user_id, id).await {
        Ok(Access::Granted(thought)) => state
            .renderer
            .render("thoughts/edit", json!({ "thought": thought })),
        Ok(Access::Denied) => redirect("/thoughts", &[]),
        Ok(Access::NotFound) => state.renderer.error_page(ErrorPage::NotFound),
        Err(e) => fault(state, "Failed to load thought for editing", e),
    }
}

/// PUT /thoughts/{id}
pub async fn update(state: &AppState, req: &RouteRequest, id: &str) -> Response<BoxBody> {
    let identity = authenticated!(state, req);
    let Ok(id) = id.parse::<ThoughtId>() else {
        return state.renderer.error_page(ErrorPage::NotFound);
    };

    let form: ThoughtForm = match req.parse_body() {
        Ok(form) => form,
        Err(e) => return error_response(&e),
    };
    let status = match form.status() {
        Ok(status) => status,
        Err(e) => return bad_request(&e),
    };
    if form.body.as_deref().is_some_and(|body| body.trim().is_empty()) {
        return bad_request("Thought body is required");
    }
    let patch = ThoughtPatch {
        body: form.body,
        status,
    };

    match state.lifecycle.update(identity.user_id, id, patch).await {
        Ok(Access::Granted(_)) => redirect("/dashboard", &[]),
        Ok(Access::Denied) => {
            warn!(thought = %id, requester = %identity.user_id, "Update refused");
            redirect("/thoughts", &[])
        }
        Ok(Access::NotFound) => state.renderer.error_page(ErrorPage::NotFound),
        Err(e) => fault(state, "Failed to update thought", e),
    }
}

/// DELETE /thoughts/{id}
pub async fn delete(state: &AppState, req: &RouteRequest, id: &str) -> Response<BoxBody> {
    let identity = authenticated!(state, req);
    let Ok(id) = id.parse::<ThoughtId>() else {
        return state.renderer.error_page(ErrorPage::NotFound);
    };

    match state.lifecycle.delete(identity.user_id, id).await {
        Ok(Access::Granted(())) => redirect("/dashboard", &[]),
        Ok(Access::Denied) => {
            warn!(thought = %id, requester = %identity.user_id, "Delete refused");
            redirect("/thoughts", &[])
        }
        Ok(Access::NotFound) => state.renderer.error_page(ErrorPage::NotFound),
        Err(e) => fault(state, "Failed to delete thought", e),
    }
}

/// GET /thoughts/user/{userId}
pub async fn by_user(state: &AppState, req: &RouteRequest, user_id: &str) -> Response<BoxBody> {
    let identity = authenticated!(state, req);

    // An id that cannot name a user has no thoughts
    let Ok(target) = user_id.parse::<UserId>() else {
        return state
            .renderer
            .render("thoughts/index", json!({ "thoughts": [] }));
    };

    match state.lifecycle.list_by_user(identity.user_id, target).await {
        Ok(thoughts) => state
            .renderer
            .render("thoughts/index", json!({ "thoughts": thoughts })),
        Err(e) => fault(state, "Failed to list thoughts by user", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_status() {
        let form: ThoughtForm = serde_urlencoded::from_str("body=hi&status=Private").unwrap();
        assert_eq!(form.status(), Ok(Some(Status::Private)));

        let form: ThoughtForm = serde_urlencoded::from_str("body=hi&status=").unwrap();
        assert_eq!(form.status(), Ok(None));

        let form: ThoughtForm = serde_urlencoded::from_str("status=secret").unwrap();
        assert!(form.status().is_err());
    }

    #[test]
    fn test_form_ignores_method_field() {
        let form: ThoughtForm = serde_urlencoded::from_str("_method=PUT&body=edited").unwrap();
        assert_eq!(form.body.as_deref(), Some("edited"));
        assert!(form.status.is_none());
    }
}

//! HTTP routes for Thoughts
//!
//! The server collects each request into a [`RouteRequest`] and hands it to
//! [`dispatch`], which picks the handler by method and path.

pub mod auth_routes;
pub mod health;
pub mod index;
pub mod thoughts;

use bytes::Bytes;
use hyper::header::{HeaderMap, CONTENT_TYPE};
use hyper::{Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};

use crate::auth::Identity;
use crate::render::{json_response, redirect, BoxBody, ErrorPage};
use crate::server::AppState;
use crate::types::ThoughtsError;

pub use health::health_check;

/// Largest accepted request body
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Header naming the real method of a POST
pub const METHOD_OVERRIDE_HEADER: &str = "x-http-method-override";

/// A fully-read request
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RouteRequest {
    pub fn new(method: Method, uri_path_and_query: &str) -> Self {
        let (path, query) = match uri_path_and_query.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (uri_path_and_query.to_string(), None),
        };
        Self {
            method,
            path,
            query,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    fn is_json(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/json"))
            .unwrap_or(false)
    }

    /// Parse the body as JSON or as an urlencoded form, by content type
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, ThoughtsError> {
        if self.body.len() > MAX_BODY_BYTES {
            return Err(ThoughtsError::BadRequest("Request body too large".into()));
        }
        if self.is_json() {
            Ok(serde_json::from_slice(&self.body)?)
        } else {
            Ok(serde_urlencoded::from_bytes(&self.body)?)
        }
    }

    pub fn parse_query<T: DeserializeOwned>(&self) -> Result<T, ThoughtsError> {
        Ok(serde_urlencoded::from_str(self.query.as_deref().unwrap_or(""))?)
    }

    /// Method after applying a POST override (`_method` field or header)
    pub fn effective_method(&self) -> Method {
        if self.method != Method::POST {
            return self.method.clone();
        }

        #[derive(Deserialize)]
        struct Override {
            #[serde(rename = "_method")]
            method: Option<String>,
        }

        let requested = self
            .headers
            .get(METHOD_OVERRIDE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .or_else(|| {
                self.parse_body::<Override>()
                    .ok()
                    .and_then(|o| o.method)
            });

        match requested.map(|m| m.trim().to_ascii_uppercase()).as_deref() {
            Some("PUT") => Method::PUT,
            Some("DELETE") => Method::DELETE,
            _ => Method::POST,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Route a request to its handler
pub async fn dispatch(state: Arc<AppState>, req: RouteRequest) -> Response<BoxBody> {
    let method = req.effective_method();
    let path = normalize_path(&req.path).to_string();

    if req.body.len() > MAX_BODY_BYTES {
        return bad_request("Request body too large");
    }

    match (&method, path.as_str()) {
        (&Method::GET, "/") => index::login(&state, &req),
        (&Method::GET, "/about") => index::about(&state),
        (&Method::GET, "/dashboard") => index::dashboard(&state, &req).await,
        (&Method::GET, "/health") => health_check(&state),

        (&Method::GET, "/auth/google") => auth_routes::google(&state, &req),
        (&Method::GET, "/auth/google/callback") => auth_routes::google_callback(&state, &req).await,
        (&Method::GET, "/auth/logout") => auth_routes::logout(&state),
        (&Method::GET, "/auth/dev-login") if state.args.dev_mode => {
            auth_routes::dev_login(&state, &req).await
        }

        (&Method::GET, "/thoughts/add") => thoughts::add_form(&state, &req),
        (&Method::POST, "/thoughts") => thoughts::create(&state, &req).await,
        (&Method::GET, "/thoughts") => thoughts::index(&state, &req).await,
        (&Method::GET, p) if p.starts_with("/thoughts/edit/") => {
            let id = p.strip_prefix("/thoughts/edit/").unwrap_or("");
            thoughts::edit_form(&state, &req, id).await
        }
        (&Method::GET, p) if p.starts_with("/thoughts/user/") => {
            let user_id = p.strip_prefix("/thoughts/user/").unwrap_or("");
            thoughts::by_user(&state, &req, user_id).await
        }
        (&Method::GET, p) if p.starts_with("/thoughts/") => {
            let id = p.strip_prefix("/thoughts/").unwrap_or("");
            thoughts::show(&state, &req, id).await
        }
        (&Method::PUT, p) if p.starts_with("/thoughts/") => {
            let id = p.strip_prefix("/thoughts/").unwrap_or("");
            thoughts::update(&state, &req, id).await
        }
        (&Method::DELETE, p) if p.starts_with("/thoughts/") => {
            let id = p.strip_prefix("/thoughts/").unwrap_or("");
            thoughts::delete(&state, &req, id).await
        }

        _ => state.renderer.error_page(ErrorPage::NotFound),
    }
}

/// Strip a trailing slash (but keep `/`)
fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => path,
    }
}

/// Guard for routes that need a logged-in user; others are sent to `/`
pub(crate) fn require_user(state: &AppState, req: &RouteRequest) -> Result<Identity, Response<BoxBody>> {
    state
        .authenticator
        .current_user(&req.headers)
        .ok_or_else(|| redirect("/", &[]))
}

/// Render a failed operation: faults get the logged 500 page, request
/// problems a JSON error with their own status
pub(crate) fn fault(state: &AppState, context: &str, err: ThoughtsError) -> Response<BoxBody> {
    if !err.is_fault() {
        warn!("{}: {}", context, err);
        return error_response(&err);
    }
    error!("{}: {}", context, err);
    state.renderer.error_page(ErrorPage::ServerError)
}

pub(crate) fn error_response(err: &ThoughtsError) -> Response<BoxBody> {
    json_response(
        err.status_code(),
        &ErrorResponse {
            error: err.to_string(),
        },
    )
}

pub(crate) fn bad_request(message: &str) -> Response<BoxBody> {
    error_response(&ThoughtsError::BadRequest(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn post(body: &'static str, content_type: &'static str) -> RouteRequest {
        let mut req = RouteRequest::new(Method::POST, "/thoughts/abc");
        req.headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        req.body = Bytes::from_static(body.as_bytes());
        req
    }

    #[test]
    fn test_split_query() {
        let req = RouteRequest::new(Method::GET, "/auth/google/callback?code=1&state=2");
        assert_eq!(req.path, "/auth/google/callback");
        assert_eq!(req.query.as_deref(), Some("code=1&state=2"));
    }

    #[test]
    fn test_method_override_from_form() {
        let req = post("_method=PUT&body=hi", "application/x-www-form-urlencoded");
        assert_eq!(req.effective_method(), Method::PUT);

        let req = post("_method=delete", "application/x-www-form-urlencoded");
        assert_eq!(req.effective_method(), Method::DELETE);

        let req = post("body=hi", "application/x-www-form-urlencoded");
        assert_eq!(req.effective_method(), Method::POST);
    }

    #[test]
    fn test_method_override_from_json_and_header() {
        let req = post(r#"{"_method":"DELETE"}"#, "application/json");
        assert_eq!(req.effective_method(), Method::DELETE);

        let mut req = post("", "application/x-www-form-urlencoded");
        req.headers
            .insert(METHOD_OVERRIDE_HEADER, HeaderValue::from_static("PUT"));
        assert_eq!(req.effective_method(), Method::PUT);
    }

    #[test]
    fn test_override_ignored_for_get() {
        let mut req = RouteRequest::new(Method::GET, "/thoughts");
        req.headers
            .insert(METHOD_OVERRIDE_HEADER, HeaderValue::from_static("DELETE"));
        assert_eq!(req.effective_method(), Method::GET);
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/thoughts/"), "/thoughts");
        assert_eq!(normalize_path("/thoughts"), "/thoughts");
    }

    #[test]
    fn test_oversized_body_rejected() {
        let mut req = RouteRequest::new(Method::POST, "/thoughts");
        req.body = Bytes::from(vec![b'a'; MAX_BODY_BYTES + 1]);
        assert!(req.parse_body::<serde_json::Value>().is_err());
    }
}

//! Presentation: views, error pages, redirects
//!
//! Route handlers name a view and hand over a payload; the [`Renderer`]
//! decides what the response looks like. [`JsonViews`] answers with
//! `{"view": "<name>", ...payload}`.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Response, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Error categories with a dedicated page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPage {
    NotFound,
    ServerError,
}

impl ErrorPage {
    pub fn view(&self) -> &'static str {
        match self {
            ErrorPage::NotFound => "error/404",
            ErrorPage::ServerError => "error/500",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ErrorPage::NotFound => StatusCode::NOT_FOUND,
            ErrorPage::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Turns named views into responses
pub trait Renderer: Send + Sync {
    /// Render `view` with `payload` (an object, or `Value::Null` for none)
    fn render(&self, view: &str, payload: Value) -> Response<BoxBody>;

    fn error_page(&self, page: ErrorPage) -> Response<BoxBody>;
}

/// Views rendered as JSON documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonViews;

impl JsonViews {
    fn document(view: &str, payload: Value) -> Value {
        let mut body = Map::new();
        body.insert("view".into(), Value::String(view.to_string()));
        match payload {
            Value::Object(fields) => body.extend(fields),
            Value::Null => {}
            other => {
                body.insert("data".into(), other);
            }
        }
        Value::Object(body)
    }
}

impl Renderer for JsonViews {
    fn render(&self, view: &str, payload: Value) -> Response<BoxBody> {
        json_response(StatusCode::OK, &Self::document(view, payload))
    }

    fn error_page(&self, page: ErrorPage) -> Response<BoxBody> {
        json_response(page.status(), &Self::document(page.view(), Value::Null))
    }
}

pub fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    let mut response = Response::new(full_body(json));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );
    response
}

/// 302 to `location`, optionally setting cookies
pub fn redirect(location: &str, cookies: &[String]) -> Response<BoxBody> {
    let mut builder = Response::builder()
        .status(StatusCode::FOUND)
        .header(header::LOCATION, location)
        .header(header::CACHE_CONTROL, "no-store");

    for cookie in cookies {
        builder = builder.header(header::SET_COOKIE, cookie.as_str());
    }

    builder.body(empty_body()).unwrap_or_else(|_| {
        // Only reachable with a location that is not a valid header value
        let mut response = Response::new(empty_body());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

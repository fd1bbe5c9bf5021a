//! Liveness endpoint
//!
//! `/health` returns 200 whenever the server is accepting requests, along
//! with the storage backend actually in use.

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::render::{json_response, BoxBody};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// Always true while the service is running
    pub healthy: bool,
    pub version: &'static str,
    /// "development" or "production"
    pub mode: &'static str,
    /// "mongodb" or "memory"
    pub storage: &'static str,
    pub timestamp: String,
}

fn build_health_response(state: &AppState) -> HealthResponse {
    HealthResponse {
        healthy: true,
        version: env!("CARGO_PKG_VERSION"),
        mode: if state.args.dev_mode {
            "development"
        } else {
            "production"
        },
        storage: state.storage.as_str(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// GET /health
pub fn health_check(state: &AppState) -> Response<BoxBody> {
    json_response(StatusCode::OK, &build_health_response(state))
}

//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo; each request body is read in full (up to
//! [`MAX_BODY_BYTES`]) before it is routed.

use http_body_util::{BodyExt, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, info_span, warn, Instrument};

use crate::auth::{Authenticator, GoogleOAuth, SessionKeys};
use crate::config::Args;
use crate::lifecycle::ThoughtLifecycle;
use crate::render::{BoxBody, JsonViews, Renderer};
use crate::routes::{self, bad_request, RouteRequest, MAX_BODY_BYTES};
use crate::store::{MemoryStore, ThoughtStore, UserDirectory};
use crate::types::ThoughtsError;

/// Which persistence backend is serving requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    MongoDb,
    Memory,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::MongoDb => "mongodb",
            StorageBackend::Memory => "memory",
        }
    }
}

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub lifecycle: ThoughtLifecycle,
    pub authenticator: Authenticator,
    /// Google login, when client credentials are configured
    pub google: Option<GoogleOAuth>,
    pub renderer: Arc<dyn Renderer>,
    pub storage: StorageBackend,
}

impl AppState {
    /// Create AppState over the given persistence collaborators
    pub fn new(
        args: Args,
        thoughts: Arc<dyn ThoughtStore>,
        users: Arc<dyn UserDirectory>,
        storage: StorageBackend,
    ) -> Result<Self, ThoughtsError> {
        let secret = args
            .session_secret()
            .ok_or_else(|| ThoughtsError::Config("SESSION_SECRET is not set".into()))?;
        let keys = SessionKeys::new(secret, args.session_expiry_seconds)?;
        let google = GoogleOAuth::from_args(&args.google);

        Ok(Self {
            args,
            lifecycle: ThoughtLifecycle::new(thoughts, users),
            authenticator: Authenticator::new(keys),
            google,
            renderer: Arc::new(JsonViews),
            storage,
        })
    }

    /// Create AppState backed by a fresh in-memory store
    pub fn in_memory(args: Args) -> Result<Self, ThoughtsError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(args, store.clone(), store, StorageBackend::Memory)
    }

    /// Replace the presentation renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = renderer;
        self
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), ThoughtsError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!(
        "Thoughts listening on {} (storage: {})",
        state.args.listen,
        state.storage.as_str()
    );

    if state.args.dev_mode {
        warn!("Development mode enabled - /auth/dev-login is open");
    }
    if state.google.is_none() {
        warn!("Google OAuth not configured - /auth/google is disabled");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Read the request and hand it to the router
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let (parts, body) = req.into_parts();
    let request_id = uuid::Uuid::new_v4();

    info!("[{}] {} {} ({})", addr, parts.method, parts.uri.path(), request_id);

    let body = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("[{}] Rejected request body: {}", addr, e);
            return Ok(bad_request("Request body too large or unreadable"));
        }
    };

    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let mut route_req = RouteRequest::new(parts.method, path_and_query);
    route_req.headers = parts.headers;
    route_req.body = body;

    Ok(routes::dispatch(state, route_req)
        .instrument(info_span!("request", id = %request_id))
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::args_from_argv;

    #[test]
    fn test_production_state_requires_secret() {
        let args = args_from_argv(&["thoughts"]);
        let Err(err) = AppState::in_memory(args) else {
            panic!("expected a configuration error");
        };
        assert!(matches!(err, ThoughtsError::Config(_)));
    }

    #[test]
    fn test_dev_state_uses_memory_store() {
        let args = args_from_argv(&["thoughts", "--dev-mode"]);
        let state = AppState::in_memory(args).unwrap();
        assert_eq!(state.storage, StorageBackend::Memory);
        assert!(state.google.is_none());
    }
}

//! HTTP server for Thoughts

pub mod http;

pub use http::{run, AppState, StorageBackend};

//! Thoughts - share short thoughts, publicly or privately
//!
//! Users sign in with Google and keep short text records, each either public
//! (readable by every signed-in user) or private (readable by its owner only).
//! Access decisions live in [`policy`]; [`lifecycle`] applies them to every
//! create, read, update and delete.

pub mod auth;
pub mod config;
pub mod db;
pub mod lifecycle;
pub mod policy;
pub mod render;
pub mod routes;
pub mod server;
pub mod store;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{Result, ThoughtsError};

//! Database layer for Thoughts
//!
//! MongoDB storage for thoughts and users.

pub mod mongo;
pub mod schemas;
pub mod store;

pub use mongo::{MongoClient, MongoCollection};
pub use schemas::{ThoughtDoc, UserDoc};
pub use store::MongoStore;

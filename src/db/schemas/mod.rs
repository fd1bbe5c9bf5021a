//! Database schemas for Thoughts
//!
//! Defines MongoDB document structures for thoughts and users.

mod thought;
mod user;

pub use thought::{patch_update, ThoughtDoc, THOUGHT_COLLECTION};
pub use user::{profile_upsert, UserDoc, USER_COLLECTION};

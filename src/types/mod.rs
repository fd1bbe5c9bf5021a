//! Shared types for Thoughts

pub mod error;
pub mod ids;
pub mod thought;

pub use error::{Result, ThoughtsError};
pub use ids::{ThoughtId, UserId};
pub use thought::{
    Author, NewThought, Status, Thought, ThoughtPatch, ThoughtView, User, UserProfile,
};

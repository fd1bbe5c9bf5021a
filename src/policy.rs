//! Access policy for thoughts
//!
//! A pure decision over (requester, record, intent):
//! - missing record: `NotFound`
//! - `Write`: only the owner
//! - `Read`: the owner, or anyone when the thought is public

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Thought, UserId};

/// What the requester wants to do with the thought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Read,
    /// Update or delete
    Write,
}

/// Outcome of an access check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Allow,
    Deny,
    NotFound,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Allow => write!(f, "ALLOW"),
            Verdict::Deny => write!(f, "DENY"),
            Verdict::NotFound => write!(f, "NOT_FOUND"),
        }
    }
}

/// Decide whether `requester` may act on `thought` with `intent`.
pub fn evaluate(requester: UserId, thought: Option<&Thought>, intent: Intent) -> Verdict {
    let Some(thought) = thought else {
        return Verdict::NotFound;
    };

    let allowed = match intent {
        Intent::Write => thought.is_owned_by(requester),
        Intent::Read => thought.is_owned_by(requester) || thought.is_public(),
    };

    if allowed {
        Verdict::Allow
    } else {
        Verdict::Deny
    }
}

//! Thought lifecycle: create, read, update, delete
//!
//! Every operation takes the requester explicitly, fetches the record, asks
//! [`policy::evaluate`] for a verdict, and only then reads or writes.
//! `Denied` and `NotFound` are ordinary outcomes; the `Err` side of the
//! returned `Result` carries persistence faults only.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::policy::{self, Intent, Verdict};
use crate::store::{Order, ThoughtFilter, ThoughtStore, UserDirectory};
use crate::types::{
    Author, NewThought, Result, Status, Thought, ThoughtId, ThoughtPatch, ThoughtView, UserId,
};

/// Outcome of an access-checked operation
#[derive(Debug, Clone, PartialEq)]
pub enum Access<T> {
    Granted(T),
    Denied,
    NotFound,
}

impl<T> Access<T> {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }

    pub fn granted(self) -> Option<T> {
        match self {
            Access::Granted(value) => Some(value),
            _ => None,
        }
    }
}

/// Orchestrates thought state transitions over the persistence collaborators
#[derive(Clone)]
pub struct ThoughtLifecycle {
    thoughts: Arc<dyn ThoughtStore>,
    users: Arc<dyn UserDirectory>,
}

impl ThoughtLifecycle {
    pub fn new(thoughts: Arc<dyn ThoughtStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { thoughts, users }
    }

    pub fn users(&self) -> &Arc<dyn UserDirectory> {
        &self.users
    }

    /// Persist a new thought owned by `owner`
    pub async fn create(&self, owner: UserId, body: String, status: Status) -> Result<ThoughtId> {
        let thought = self
            .thoughts
            .create(NewThought {
                owner,
                body,
                status,
            })
            .await?;
        info!(thought = %thought.id, owner = %owner, status = %status, "Thought created");
        Ok(thought.id)
    }

    /// Fetch a thought for display
    pub async fn get(&self, requester: UserId, id: ThoughtId) -> Result<Access<ThoughtView>> {
        let access = self.fetch_checked(requester, id, Intent::Read).await?;
        Ok(match access {
            Access::Granted(thought) => {
                let author = self.users.find_user(thought.owner).await?.as_ref().map(Author::from);
                Access::Granted(ThoughtView { thought, author })
            }
            Access::Denied => Access::Denied,
            Access::NotFound => Access::NotFound,
        })
    }

    /// Fetch a thought for the edit form; only the owner gets it
    pub async fn get_for_edit(&self, requester: UserId, id: ThoughtId) -> Result<Access<Thought>> {
        self.fetch_checked(requester, id, Intent::Write).await
    }

    /// All public thoughts, newest first, each with its author
    pub async fn list_public(&self, requester: UserId) -> Result<Vec<ThoughtView>> {
        debug!(requester = %requester, "Listing public thoughts");
        let thoughts = self.thoughts.find(ThoughtFilter::public(), Order::NewestFirst).await?;
        self.annotate(thoughts).await
    }

    /// Every thought the requester owns, in any status
    pub async fn list_own(&self, requester: UserId) -> Result<Vec<Thought>> {
        self.thoughts
            .find(ThoughtFilter::owned_by(requester), Order::Natural)
            .await
    }

    /// Public thoughts owned by `target`.
    ///
    /// Private thoughts are left out even when `requester == target`.
    pub async fn list_by_user(&self, requester: UserId, target: UserId) -> Result<Vec<ThoughtView>> {
        debug!(requester = %requester, target = %target, "Listing thoughts by user");
        let thoughts = self
            .thoughts
            .find(
                ThoughtFilter::owned_by(target).with_status(Status::Public),
                Order::Natural,
            )
            .await?;
        self.annotate(thoughts).await
    }

    /// Merge `patch` into the thought if the requester owns it
    pub async fn update(
        &self,
        requester: UserId,
        id: ThoughtId,
        patch: ThoughtPatch,
    ) -> Result<Access<Thought>> {
        let thought = match self.fetch_checked(requester, id, Intent::Write).await? {
            Access::Granted(thought) => thought,
            Access::Denied => return Ok(Access::Denied),
            Access::NotFound => return Ok(Access::NotFound),
        };

        if patch.is_empty() {
            return Ok(Access::Granted(thought));
        }

        // A concurrent delete between fetch and write surfaces as NotFound
        match self.thoughts.update_by_id(id, &patch).await? {
            Some(updated) => {
                info!(thought = %id, owner = %requester, "Thought updated");
                Ok(Access::Granted(updated))
            }
            None => Ok(Access::NotFound),
        }
    }

    /// Permanently remove the thought if the requester owns it
    pub async fn delete(&self, requester: UserId, id: ThoughtId) -> Result<Access<()>> {
        match self.fetch_checked(requester, id, Intent::Write).await? {
            Access::Granted(_) => {}
            Access::Denied => return Ok(Access::Denied),
            Access::NotFound => return Ok(Access::NotFound),
        }

        if self.thoughts.delete_by_id(id).await? {
            info!(thought = %id, owner = %requester, "Thought deleted");
            Ok(Access::Granted(()))
        } else {
            Ok(Access::NotFound)
        }
    }

    async fn fetch_checked(
        &self,
        requester: UserId,
        id: ThoughtId,
        intent: Intent,
    ) -> Result<Access<Thought>> {
        let record = self.thoughts.find_by_id(id).await?;

        let verdict = policy::evaluate(requester, record.as_ref(), intent);
        debug!(thought = %id, requester = %requester, ?intent, %verdict, "Access evaluated");

        Ok(match verdict {
            Verdict::Allow => match record {
                Some(thought) => Access::Granted(thought),
                None => Access::NotFound,
            },
            Verdict::Deny => {
                warn!(thought = %id, requester = %requester, ?intent, "Access denied");
                Access::Denied
            }
            Verdict::NotFound => Access::NotFound,
        })
    }

    async fn annotate(&self, thoughts: Vec<Thought>) -> Result<Vec<ThoughtView>> {
        let mut owners: Vec<UserId> = thoughts.iter().map(|t| t.owner).collect();
        owners.sort();
        owners.dedup();

        let authors: HashMap<UserId, Author> = self
            .users
            .find_users(&owners)
            .await?
            .iter()
            .map(|u| (u.id, Author::from(u)))
            .collect();

        Ok(thoughts
            .into_iter()
            .map(|thought| {
                let author = authors.get(&thought.owner).cloned();
                ThoughtView { thought, author }
            })
            .collect())
    }
}

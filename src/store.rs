//! Persistence collaborators
//!
//! The lifecycle talks to storage only through these traits. `MongoStore`
//! (in [`crate::db`]) backs production; [`MemoryStore`] backs dev mode when
//! MongoDB is unreachable, and the tests.

use chrono::Utc;
use tokio::sync::RwLock;

use crate::types::{
    NewThought, Result, Status, Thought, ThoughtId, ThoughtPatch, User, UserId, UserProfile,
};

/// Selection over the thoughts collection. Empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThoughtFilter {
    pub owner: Option<UserId>,
    pub status: Option<Status>,
}

impl ThoughtFilter {
    pub fn public() -> Self {
        Self {
            owner: None,
            status: Some(Status::Public),
        }
    }

    pub fn owned_by(owner: UserId) -> Self {
        Self {
            owner: Some(owner),
            status: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    pub fn matches(&self, thought: &Thought) -> bool {
        self.owner.map_or(true, |owner| thought.owner == owner)
            && self.status.map_or(true, |status| thought.status == status)
    }
}

/// Result ordering for [`ThoughtStore::find`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Whatever order the store keeps (insertion order for both backends)
    #[default]
    Natural,
    /// `created_at` descending; ties broken by most recently inserted
    NewestFirst,
}

/// Storage for thought records
#[async_trait::async_trait]
pub trait ThoughtStore: Send + Sync {
    async fn find(&self, filter: ThoughtFilter, order: Order) -> Result<Vec<Thought>>;

    async fn find_by_id(&self, id: ThoughtId) -> Result<Option<Thought>>;

    /// Persist a new record; the store assigns `id` and `created_at`
    async fn create(&self, thought: NewThought) -> Result<Thought>;

    /// Merge `patch` into the record; `None` if it no longer exists
    async fn update_by_id(&self, id: ThoughtId, patch: &ThoughtPatch) -> Result<Option<Thought>>;

    /// Remove permanently; `false` if it no longer exists
    async fn delete_by_id(&self, id: ThoughtId) -> Result<bool>;
}

/// Read access to users, plus the login-time upsert
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: UserId) -> Result<Option<User>>;

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>>;

    /// Create the user on first login, refresh the profile on later ones
    async fn upsert_profile(&self, profile: UserProfile) -> Result<User>;
}

// =============================================================================
// In-memory implementation
// =============================================================================

/// Process-local store, kept in insertion order
#[derive(Default)]
pub struct MemoryStore {
    thoughts: RwLock<Vec<Thought>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn thought_count(&self) -> usize {
        self.thoughts.read().await.len()
    }
}

#[async_trait::async_trait]
impl ThoughtStore for MemoryStore {
    async fn find(&self, filter: ThoughtFilter, order: Order) -> Result<Vec<Thought>> {
        let thoughts = self.thoughts.read().await;
        let mut found: Vec<Thought> = thoughts.iter().filter(|t| filter.matches(t)).cloned().collect();

        if order == Order::NewestFirst {
            // Reverse first so the stable sort leaves later inserts ahead on ties
            found.reverse();
            found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        Ok(found)
    }

    async fn find_by_id(&self, id: ThoughtId) -> Result<Option<Thought>> {
        let thoughts = self.thoughts.read().await;
        Ok(thoughts.iter().find(|t| t.id == id).cloned())
    }

    async fn create(&self, thought: NewThought) -> Result<Thought> {
        let record = Thought {
            id: ThoughtId::new(),
            owner: thought.owner,
            body: thought.body,
            status: thought.status,
            created_at: Utc::now(),
        };
        self.thoughts.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_by_id(&self, id: ThoughtId, patch: &ThoughtPatch) -> Result<Option<Thought>> {
        let mut thoughts = self.thoughts.write().await;
        Ok(thoughts.iter_mut().find(|t| t.id == id).map(|t| {
            patch.apply(t);
            t.clone()
        }))
    }

    async fn delete_by_id(&self, id: ThoughtId) -> Result<bool> {
        let mut thoughts = self.thoughts.write().await;
        let before = thoughts.len();
        thoughts.retain(|t| t.id != id);
        Ok(thoughts.len() < before)
    }
}

#[async_trait::async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> Result<User> {
        let mut users = self.users.write().await;

        if let Some(existing) = users.iter_mut().find(|u| u.google_id == profile.google_id) {
            existing.display_name = profile.display_name;
            existing.first_name = profile.first_name;
            existing.last_name = profile.last_name;
            existing.image = profile.image;
            return Ok(existing.clone());
        }

        let user = User {
            id: UserId::new(),
            google_id: profile.google_id,
            display_name: profile.display_name,
            first_name: profile.first_name,
            last_name: profile.last_name,
            image: profile.image,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

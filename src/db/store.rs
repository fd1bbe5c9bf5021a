//! MongoDB implementation of the persistence collaborators

use bson::{doc, Document};

use crate::db::mongo::{MongoClient, MongoCollection};
use crate::db::schemas::{
    patch_update, profile_upsert, ThoughtDoc, UserDoc, THOUGHT_COLLECTION, USER_COLLECTION,
};
use crate::store::{Order, ThoughtFilter, ThoughtStore, UserDirectory};
use crate::types::{
    NewThought, Result, Thought, ThoughtId, ThoughtPatch, ThoughtsError, User, UserId, UserProfile,
};

/// Thoughts and users backed by MongoDB collections
pub struct MongoStore {
    thoughts: MongoCollection<ThoughtDoc>,
    users: MongoCollection<UserDoc>,
}

impl MongoStore {
    /// Open both collections and ensure their indexes
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        Ok(Self {
            thoughts: mongo.collection::<ThoughtDoc>(THOUGHT_COLLECTION).await?,
            users: mongo.collection::<UserDoc>(USER_COLLECTION).await?,
        })
    }
}

fn filter_document(filter: &ThoughtFilter) -> Document {
    let mut query = Document::new();
    if let Some(owner) = filter.owner {
        query.insert("user", owner.oid());
    }
    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }
    query
}

fn sort_document(order: Order) -> Option<Document> {
    match order {
        Order::Natural => None,
        // ObjectIds grow with insertion, so `_id` breaks createdAt ties
        Order::NewestFirst => Some(doc! { "createdAt": -1, "_id": -1 }),
    }
}

#[async_trait::async_trait]
impl ThoughtStore for MongoStore {
    async fn find(&self, filter: ThoughtFilter, order: Order) -> Result<Vec<Thought>> {
        self.thoughts
            .find_many(filter_document(&filter), sort_document(order))
            .await?
            .into_iter()
            .map(Thought::try_from)
            .collect()
    }

    async fn find_by_id(&self, id: ThoughtId) -> Result<Option<Thought>> {
        self.thoughts
            .find_one(doc! { "_id": id.oid() })
            .await?
            .map(Thought::try_from)
            .transpose()
    }

    async fn create(&self, thought: NewThought) -> Result<Thought> {
        let doc = ThoughtDoc::new(thought);
        self.thoughts.insert_one(&doc).await?;
        Thought::try_from(doc)
    }

    async fn update_by_id(&self, id: ThoughtId, patch: &ThoughtPatch) -> Result<Option<Thought>> {
        self.thoughts
            .find_one_and_update(doc! { "_id": id.oid() }, patch_update(patch), false)
            .await?
            .map(Thought::try_from)
            .transpose()
    }

    async fn delete_by_id(&self, id: ThoughtId) -> Result<bool> {
        self.thoughts.delete_one(doc! { "_id": id.oid() }).await
    }
}

#[async_trait::async_trait]
impl UserDirectory for MongoStore {
    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        self.users
            .find_one(doc! { "_id": id.oid() })
            .await?
            .map(User::try_from)
            .transpose()
    }

    async fn find_users(&self, ids: &[UserId]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let oids: Vec<_> = ids.iter().map(UserId::oid).collect();
        self.users
            .find_many(doc! { "_id": { "$in": oids } }, None)
            .await?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    async fn upsert_profile(&self, profile: UserProfile) -> Result<User> {
        let (filter, update) = profile_upsert(&profile);
        let doc = self
            .users
            .find_one_and_update(filter, update, true)
            .await?
            .ok_or_else(|| {
                ThoughtsError::Database(format!("Upsert returned no user for {}", profile.google_id))
            })?;
        User::try_from(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Status;

    #[test]
    fn test_filter_document() {
        assert!(filter_document(&ThoughtFilter::default()).is_empty());

        let owner = UserId::new();
        let query = filter_document(&ThoughtFilter::owned_by(owner).with_status(Status::Public));
        assert_eq!(query.get_object_id("user").unwrap(), owner.oid());
        assert_eq!(query.get_str("status").unwrap(), "public");
    }

    #[test]
    fn test_sort_document() {
        assert!(sort_document(Order::Natural).is_none());
        let sort = sort_document(Order::NewestFirst).unwrap();
        assert_eq!(sort.get_i32("createdAt").unwrap(), -1);
        assert_eq!(sort.get_i32("_id").unwrap(), -1);
    }
}

//! Thought document schema

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::types::{NewThought, Status, Thought, ThoughtPatch, ThoughtsError};

/// Collection name for thoughts
pub const THOUGHT_COLLECTION: &str = "thoughts";

/// Thought document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ThoughtDoc {
    /// MongoDB document ID
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Owning user's document ID
    pub user: ObjectId,

    pub body: String,

    #[serde(default)]
    pub status: Status,

    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
}

impl ThoughtDoc {
    /// Build a document for insertion, stamped with the current time
    pub fn new(thought: NewThought) -> Self {
        Self {
            id: Some(ObjectId::new()),
            user: thought.owner.oid(),
            body: thought.body,
            status: thought.status,
            created_at: Utc::now(),
        }
    }
}

impl TryFrom<ThoughtDoc> for Thought {
    type Error = ThoughtsError;

    fn try_from(doc: ThoughtDoc) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .ok_or_else(|| ThoughtsError::Database("Thought document without _id".into()))?;
        Ok(Thought {
            id: id.into(),
            owner: doc.user.into(),
            body: doc.body,
            status: doc.status,
            created_at: doc.created_at,
        })
    }
}

/// `$set` update for the fields present in a patch
pub fn patch_update(patch: &ThoughtPatch) -> Document {
    let mut set = Document::new();
    if let Some(body) = &patch.body {
        set.insert("body", body.as_str());
    }
    if let Some(status) = patch.status {
        set.insert("status", status.as_str());
    }
    doc! { "$set": set }
}

impl IntoIndexes for ThoughtDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![
            // Dashboard and per-user listings
            (
                doc! { "user": 1 },
                Some(IndexOptions::builder().name("user_index".to_string()).build()),
            ),
            // Public feed, newest first
            (
                doc! { "status": 1, "createdAt": -1 },
                Some(
                    IndexOptions::builder()
                        .name("status_created_at_index".to_string())
                        .build(),
                ),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::UserId;

    #[test]
    fn test_document_field_names() {
        let owner = UserId::new();
        let doc = ThoughtDoc::new(NewThought {
            owner,
            body: "hi".into(),
            status: Status::Private,
        });
        let bson = bson::to_document(&doc).unwrap();

        assert_eq!(bson.get_object_id("user").unwrap(), owner.oid());
        assert_eq!(bson.get_str("status").unwrap(), "private");
        assert!(bson.get_datetime("createdAt").is_ok());
        assert!(bson.get_object_id("_id").is_ok());
    }

    #[test]
    fn test_missing_status_defaults_to_public() {
        let raw = doc! {
            "_id": ObjectId::new(),
            "user": ObjectId::new(),
            "body": "legacy",
            "createdAt": bson::DateTime::now(),
        };
        let doc: ThoughtDoc = bson::from_document(raw).unwrap();
        let thought = Thought::try_from(doc).unwrap();
        assert_eq!(thought.status, Status::Public);
    }

    #[test]
    fn test_patch_update_sets_only_present_fields() {
        let update = patch_update(&ThoughtPatch {
            body: None,
            status: Some(Status::Public),
        });
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "public");
        assert!(set.get("body").is_none());
    }
}

//! User document schema
//!
//! One document per Google account, refreshed on every login.

use bson::{doc, oid::ObjectId, Document};
use chrono::{DateTime, Utc};
use mongodb::options::IndexOptions;
use serde::{Deserialize, Serialize};

use crate::db::mongo::IntoIndexes;
use crate::types::{ThoughtsError, User, UserProfile};

/// Collection name for users
pub const USER_COLLECTION: &str = "users";

/// User document stored in MongoDB
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UserDoc {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Google account subject identifier
    pub google_id: String,

    pub display_name: String,

    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserDoc> for User {
    type Error = ThoughtsError;

    fn try_from(doc: UserDoc) -> Result<Self, Self::Error> {
        let id = doc
            .id
            .ok_or_else(|| ThoughtsError::Database("User document without _id".into()))?;
        Ok(User {
            id: id.into(),
            google_id: doc.google_id,
            display_name: doc.display_name,
            first_name: doc.first_name,
            last_name: doc.last_name,
            image: doc.image,
            created_at: doc.created_at,
        })
    }
}

/// Upsert keyed on `googleId`: profile fields always refreshed,
/// `createdAt` only written on insert
pub fn profile_upsert(profile: &UserProfile) -> (Document, Document) {
    let filter = doc! { "googleId": profile.google_id.as_str() };

    let mut set = doc! {
        "displayName": profile.display_name.as_str(),
        "firstName": profile.first_name.as_str(),
        "lastName": profile.last_name.as_str(),
    };
    match &profile.image {
        Some(image) => {
            set.insert("image", image.as_str());
        }
        None => {
            set.insert("image", bson::Bson::Null);
        }
    }

    let update = doc! {
        "$set": set,
        "$setOnInsert": { "createdAt": bson::DateTime::from_chrono(Utc::now()) },
    };

    (filter, update)
}

impl IntoIndexes for UserDoc {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)> {
        vec![(
            doc! { "googleId": 1 },
            Some(
                IndexOptions::builder()
                    .unique(true)
                    .name("google_id_unique".to_string())
                    .build(),
            ),
        )]
    }
}

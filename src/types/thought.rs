//! Domain records: thoughts, their owners, and listing views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{ThoughtId, UserId};

/// Visibility class of a thought
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Readable by every authenticated user
    #[default]
    Public,
    /// Readable by the owner only
    Private,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Public => "public",
            Status::Private => "private",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Status::Public),
            "private" => Ok(Status::Private),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// A single user-authored text record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thought {
    pub id: ThoughtId,
    /// Set at creation, never reassigned
    pub owner: UserId,
    pub body: String,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Thought {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.owner == user
    }

    pub fn is_public(&self) -> bool {
        self.status == Status::Public
    }
}

/// Fields supplied by the owner when creating a thought
#[derive(Debug, Clone, PartialEq)]
pub struct NewThought {
    pub owner: UserId,
    pub body: String,
    pub status: Status,
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThoughtPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl ThoughtPatch {
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.status.is_none()
    }

    /// Merge the patch into a record in place
    pub fn apply(&self, thought: &mut Thought) {
        if let Some(body) = &self.body {
            thought.body = body.clone();
        }
        if let Some(status) = self.status {
            thought.status = status;
        }
    }
}

/// A registered user, as provided by the OAuth login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub google_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile fields refreshed on every login
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub google_id: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub image: Option<String>,
}

/// Owner details attached to a thought in listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub id: UserId,
    pub display_name: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name.clone(),
            first_name: user.first_name.clone(),
            image: user.image.clone(),
        }
    }
}

/// A thought as shown in a listing, annotated with its author when known
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThoughtView {
    #[serde(flatten)]
    pub thought: Thought,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Thought {
        Thought {
            id: ThoughtId::new(),
            owner: UserId::new(),
            body: "hi".into(),
            status: Status::Private,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("public".parse::<Status>().unwrap(), Status::Public);
        assert_eq!(" Private ".parse::<Status>().unwrap(), Status::Private);
        assert!("secret".parse::<Status>().is_err());
        assert_eq!(Status::default(), Status::Public);
    }

    #[test]
    fn test_patch_merges_only_present_fields() {
        let mut thought = sample();
        let before = thought.clone();

        ThoughtPatch::default().apply(&mut thought);
        assert_eq!(thought, before);

        ThoughtPatch {
            body: None,
            status: Some(Status::Public),
        }
        .apply(&mut thought);
        assert_eq!(thought.body, "hi");
        assert_eq!(thought.status, Status::Public);
        assert_eq!(thought.owner, before.owner);
        assert_eq!(thought.created_at, before.created_at);
    }

    #[test]
    fn test_view_flattens_thought() {
        let thought = sample();
        let json = serde_json::to_value(ThoughtView {
            thought: thought.clone(),
            author: None,
        })
        .unwrap();
        assert_eq!(json["body"], "hi");
        assert_eq!(json["status"], "private");
        assert!(json.get("author").is_none());
    }
}

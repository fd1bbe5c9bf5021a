//! Typed identifiers
//!
//! Both users and thoughts are keyed by MongoDB ObjectIds. Wrapping them keeps
//! an owner id from ever being compared against a thought id, and makes the
//! ownership check a plain `==` on one type.

use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! object_id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(ObjectId);

        impl $name {
            /// Generate a fresh identifier
            pub fn new() -> Self {
                Self(ObjectId::new())
            }

            /// The underlying ObjectId
            pub fn oid(&self) -> ObjectId {
                self.0
            }

            /// Lowercase 24-character hex form, as used in URLs
            pub fn to_hex(&self) -> String {
                self.0.to_hex()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<ObjectId> for $name {
            fn from(oid: ObjectId) -> Self {
                Self(oid)
            }
        }

        impl FromStr for $name {
            type Err = bson::oid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                ObjectId::parse_str(s).map(Self)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0.to_hex())
            }
        }
    };
}

object_id_newtype!(
    /// Identifier of a user (the owner of thoughts)
    UserId
);

object_id_newtype!(
    /// Identifier of a single thought
    ThoughtId
);

//! Opaque string identifiers
//!
//! Every row is keyed by a server-assigned opaque string (a UUID in the
//! PostgreSQL schema). Each kind of id gets its own newtype so a comment id
//! cannot be passed where a user id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing id
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random id
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().to_string())
            }

            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[inline]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Member (session user) id
    UserId
);
define_id!(
    /// Comment id
    CommentId
);
define_id!(
    /// Like row id
    LikeId
);
define_id!(
    /// Notification id
    NotificationId
);
define_id!(
    /// Logical content unit a comment thread hangs off (a photo, a page section)
    ModuleId
);
define_id!(
    /// Likeable content id (photo, anecdote, or comment)
    TargetId
);

impl From<&CommentId> for TargetId {
    fn from(id: &CommentId) -> Self {
        Self(id.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_as_str() {
        let id = CommentId::new("c-1");
        assert_eq!(id.to_string(), "c-1");
        assert_eq!(id.as_str(), "c-1");
    }

    #[test]
    fn test_generate_is_unique() {
        assert_ne!(UserId::generate(), UserId::generate());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ModuleId::new("gallery");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"gallery\"");

        let parsed: ModuleId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_comment_id_as_target() {
        let comment = CommentId::new("abc");
        assert_eq!(TargetId::from(&comment).as_str(), "abc");
    }
}

//! Member profile - the public face of a crew member

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Display identity joined onto comments (author) and notifications (actor)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: UserId,
    pub name: String,
    pub avatar: Option<String>,
}

impl MemberProfile {
    /// Create a new MemberProfile
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            avatar: None,
        }
    }

    /// First character of the name, used when no avatar is set
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next()
    }
}

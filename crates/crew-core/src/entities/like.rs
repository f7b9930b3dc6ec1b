//! Like entity and the aggregated like state shown next to a target

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;
use crate::value_objects::{LikeId, TargetId, UserId};

/// Kind of content a like points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetType {
    Photo,
    Anecdote,
    Comment,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Anecdote => "anecdote",
            Self::Comment => "comment",
        }
    }

    /// Noun used in notification text
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Comment => "comment",
            Self::Anecdote => "post",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(Self::Photo),
            "anecdote" => Ok(Self::Anecdote),
            "comment" => Ok(Self::Comment),
            other => Err(DomainError::ValidationError(format!(
                "unknown target type: {other}"
            ))),
        }
    }
}

/// Identity of a likeable thing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LikeTarget {
    pub target_id: TargetId,
    pub target_type: TargetType,
}

impl LikeTarget {
    pub fn new(target_id: impl Into<TargetId>, target_type: TargetType) -> Self {
        Self {
            target_id: target_id.into(),
            target_type,
        }
    }

    pub fn photo(id: impl Into<TargetId>) -> Self {
        Self::new(id, TargetType::Photo)
    }

    pub fn anecdote(id: impl Into<TargetId>) -> Self {
        Self::new(id, TargetType::Anecdote)
    }

    pub fn comment(id: impl Into<TargetId>) -> Self {
        Self::new(id, TargetType::Comment)
    }
}

impl fmt::Display for LikeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.target_type, self.target_id)
    }
}

/// Like entity - at most one per (user, target)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: LikeId,
    pub user_id: UserId,
    pub target_id: TargetId,
    pub target_type: TargetType,
    pub created_at: DateTime<Utc>,
}

impl Like {
    /// Create a new Like
    pub fn new(id: LikeId, user_id: UserId, target: LikeTarget) -> Self {
        Self {
            id,
            user_id,
            target_id: target.target_id,
            target_type: target.target_type,
            created_at: Utc::now(),
        }
    }

    pub fn target(&self) -> LikeTarget {
        LikeTarget::new(self.target_id.clone(), self.target_type)
    }

    #[inline]
    pub fn is_by(&self, user_id: &UserId) -> bool {
        self.user_id == *user_id
    }
}

/// A like about to be created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLike {
    pub user_id: UserId,
    pub target: LikeTarget,
}

/// Which way a toggle moves the count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeDirection {
    On,
    Off,
}

impl LikeDirection {
    #[inline]
    pub fn delta(self) -> i64 {
        match self {
            Self::On => 1,
            Self::Off => -1,
        }
    }

    #[inline]
    pub fn inverse(self) -> Self {
        match self {
            Self::On => Self::Off,
            Self::Off => Self::On,
        }
    }
}

/// Aggregated like count for display
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub count: i64,
    pub has_liked: bool,
}

impl LikeState {
    pub fn new(count: i64, has_liked: bool) -> Self {
        Self { count, has_liked }
    }

    /// Direction a toggle from this state goes
    #[inline]
    pub fn toggle_direction(&self) -> LikeDirection {
        if self.has_liked {
            LikeDirection::Off
        } else {
            LikeDirection::On
        }
    }
}

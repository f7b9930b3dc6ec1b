//! Like entity <-> model mapper

use crew_core::entities::{Like, TargetType};
use crew_core::error::DomainError;
use crew_core::value_objects::{LikeId, TargetId, UserId};

use crate::models::LikeModel;

/// Convert LikeModel to Like entity
impl TryFrom<LikeModel> for Like {
    type Error = DomainError;

    fn try_from(model: LikeModel) -> Result<Self, Self::Error> {
        let target_type: TargetType = model
            .target_type
            .parse()
            .map_err(|e| DomainError::DatabaseError(format!("like {}: {e}", model.id)))?;

        Ok(Like {
            id: LikeId::new(model.id),
            user_id: UserId::new(model.user_id),
            target_id: TargetId::new(model.target_id),
            target_type,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(target_type: &str) -> LikeModel {
        LikeModel {
            id: "l1".to_string(),
            user_id: "u1".to_string(),
            target_id: "p1".to_string(),
            target_type: target_type.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_known_target_type() {
        let like = Like::try_from(model("anecdote")).unwrap();
        assert_eq!(like.target_type, TargetType::Anecdote);
    }

    #[test]
    fn test_unknown_target_type() {
        let err = Like::try_from(model("video")).unwrap_err();
        assert_eq!(err.code(), "DATABASE_ERROR");
    }
}

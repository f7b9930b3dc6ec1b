//! Notification entity <-> model mapper

use crew_core::entities::{Notification, NotificationKind};
use crew_core::error::DomainError;
use crew_core::value_objects::{NotificationId, TargetId, UserId};

use crate::models::NotificationModel;

use super::profile_from_join;

/// Convert NotificationModel to Notification entity
impl TryFrom<NotificationModel> for Notification {
    type Error = DomainError;

    fn try_from(model: NotificationModel) -> Result<Self, Self::Error> {
        let kind: NotificationKind = model
            .kind
            .parse()
            .map_err(|e| DomainError::DatabaseError(format!("notification {}: {e}", model.id)))?;
        let actor_id = UserId::new(model.actor_id);
        let actor = profile_from_join(&actor_id, model.actor_name, model.actor_avatar);

        Ok(Notification {
            id: NotificationId::new(model.id),
            receiver_id: UserId::new(model.receiver_id),
            actor_id,
            kind,
            content: model.content,
            target_id: TargetId::new(model.target_id),
            target_type: model.target_type,
            is_read: model.is_read,
            created_at: model.created_at,
            actor,
        })
    }
}

//! Comment entity <-> model mapper

use crew_core::entities::{Comment, MemberProfile};
use crew_core::value_objects::{CommentId, ModuleId, UserId};

use crate::models::CommentModel;

/// Build the joined profile, if the member row was found
pub fn profile_from_join(
    id: &UserId,
    name: Option<String>,
    avatar: Option<String>,
) -> Option<MemberProfile> {
    name.map(|name| MemberProfile {
        id: id.clone(),
        name,
        avatar,
    })
}

/// Convert CommentModel to Comment entity
impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        let author_id = UserId::new(model.author_id);
        let author = profile_from_join(&author_id, model.author_name, model.author_avatar);

        Comment {
            id: CommentId::new(model.id),
            content: model.content,
            author_id,
            module_id: ModuleId::new(model.module_id),
            parent_id: model.parent_id.map(CommentId::new),
            created_at: model.created_at,
            author,
            replies: Vec::new(),
        }
    }
}

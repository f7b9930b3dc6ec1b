//! Member profile <-> model mapper

use crew_core::entities::MemberProfile;
use crew_core::value_objects::UserId;

use crate::models::MemberModel;

/// Convert MemberModel to MemberProfile
impl From<MemberModel> for MemberProfile {
    fn from(model: MemberModel) -> Self {
        MemberProfile {
            id: UserId::new(model.id),
            name: model.name,
            avatar: model.avatar,
        }
    }
}

//! Domain entities - core social objects

mod comment;
mod like;
mod member;
mod notification;

pub use comment::{Comment, NewComment, COMMENT_MAX_CHARS};
pub use like::{Like, LikeDirection, LikeState, LikeTarget, NewLike, TargetType};
pub use member::MemberProfile;
pub use notification::{
    NewNotification, Notification, NotificationKind, NOTIFICATION_PREVIEW_CHARS,
};

//! Value objects - immutable identifiers

mod ids;

pub use ids::{CommentId, LikeId, ModuleId, NotificationId, TargetId, UserId};

//! Database models - SQLx-compatible structs for PostgreSQL tables

mod comment;
mod like;
mod member;
mod notification;

pub use comment::CommentModel;
pub use like::LikeModel;
pub use member::MemberModel;
pub use notification::NotificationModel;

//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in crew-core.

mod comment;
mod error;
mod like;
mod member;
mod notification;

pub use comment::PgCommentRepository;
pub use like::PgLikeRepository;
pub use member::PgMemberRepository;
pub use notification::PgNotificationRepository;

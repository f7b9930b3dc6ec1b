mod change_feed;
mod repositories;

pub use change_feed::{ChangeFeed, ChangeStream};
pub use repositories::{
    CommentRepository, LikeRepository, MemberRepository, NotificationRepository, RepoResult,
};

//! Push port - a stream of row changes per topic

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::events::{ChangeEvent, Topic};

use super::RepoResult;

/// Stream of change events; ends when the subscription is dropped
pub type ChangeStream = BoxStream<'static, ChangeEvent>;

#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Open a subscription; only events accepted by `topic` are yielded
    async fn subscribe(&self, topic: Topic) -> RepoResult<ChangeStream>;
}

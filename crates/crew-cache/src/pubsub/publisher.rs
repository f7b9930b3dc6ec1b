//! Redis Pub/Sub publisher.

use redis::AsyncCommands;

use crew_core::ChangeEvent;

use crate::pool::{RedisPool, RedisResult};
use crate::pubsub::PubSubChannel;

/// Redis Pub/Sub publisher
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a change event on the channel it routes to
    pub async fn publish_change(&self, event: &ChangeEvent) -> RedisResult<u32> {
        let channel = PubSubChannel::for_event(event);
        let payload = serde_json::to_string(event)?;
        let receivers = self.publish_raw(&channel, &payload).await?;

        tracing::debug!(
            channel = %channel,
            event_type = event.event_type(),
            receivers = receivers,
            "Published change"
        );

        Ok(receivers)
    }

    /// Publish a raw message to a channel
    pub async fn publish_raw(&self, channel: &PubSubChannel, message: &str) -> RedisResult<u32> {
        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(channel.name(), message).await?;
        Ok(receivers)
    }
}

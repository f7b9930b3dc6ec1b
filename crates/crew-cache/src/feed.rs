//! `ChangeFeed` over Redis Pub/Sub

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crew_core::{ChangeEvent, ChangeFeed, ChangeStream, DomainError, RepoResult, Topic};

use crate::pubsub::{PubSubChannel, ReceivedMessage, Subscriber};

/// Change feed backed by a shared [`Subscriber`]
#[derive(Clone)]
pub struct RedisChangeFeed {
    subscriber: Arc<Subscriber>,
}

impl RedisChangeFeed {
    pub fn new(subscriber: Subscriber) -> Self {
        Self {
            subscriber: Arc::new(subscriber),
        }
    }

    pub fn subscriber(&self) -> &Subscriber {
        &self.subscriber
    }
}

/// Holds the topic's channel references; released when the stream is dropped
struct Lease {
    subscriber: Arc<Subscriber>,
    channels: Vec<PubSubChannel>,
}

impl Drop for Lease {
    fn drop(&mut self) {
        if let Err(e) = self.subscriber.unsubscribe(&self.channels) {
            tracing::warn!(error = %e, "Failed to release Pub/Sub channels");
        }
    }
}

struct FeedState {
    rx: broadcast::Receiver<ReceivedMessage>,
    topic: Topic,
    lease: Lease,
}

impl FeedState {
    fn wants(&self, message: &ReceivedMessage) -> Option<ChangeEvent> {
        if !self.lease.channels.contains(&message.channel) {
            return None;
        }
        message
            .event
            .as_ref()
            .filter(|event| self.topic.accepts(event))
            .cloned()
    }
}

#[async_trait]
impl ChangeFeed for RedisChangeFeed {
    async fn subscribe(&self, topic: Topic) -> RepoResult<ChangeStream> {
        let channels = PubSubChannel::for_topic(&topic);

        // Receiver first so nothing published after SUBSCRIBE is missed
        let rx = self.subscriber.receiver();
        self.subscriber
            .subscribe(&channels)
            .map_err(|e| DomainError::TransportError(e.to_string()))?;

        tracing::debug!(topic = %topic, "Change feed subscription opened");

        let state = FeedState {
            rx,
            topic,
            lease: Lease {
                subscriber: self.subscriber.clone(),
                channels,
            },
        };

        let events = stream::unfold(state, |mut state| async move {
            loop {
                match state.rx.recv().await {
                    Ok(message) => {
                        if let Some(event) = state.wants(&message) {
                            return Some((event, state));
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(topic = %state.topic, skipped, "Change feed lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(events.boxed())
    }
}

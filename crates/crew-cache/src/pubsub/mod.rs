//! Redis Pub/Sub module.
//!
//! Change events are published to one channel each and consumed through a
//! shared subscriber connection.

mod channels;
mod publisher;
mod subscriber;

pub use channels::{
    PubSubChannel, COMMENTS_PREFIX, COMMENT_DELETES_CHANNEL, LIKES_CHANNEL, NOTIFICATIONS_PREFIX,
};
pub use publisher::Publisher;
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig, SubscriberError,
    SubscriberResult,
};

//! # crew-cache
//!
//! Redis transport for row change events.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Pub/Sub**: Change events fanned out to per-topic channels
//! - **Change Feed**: [`RedisChangeFeed`] implements the `ChangeFeed` port
//!
//! ## Example
//!
//! ```ignore
//! use crew_cache::{Publisher, RedisChangeFeed, RedisPool, RedisPoolConfig, SubscriberBuilder};
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let publisher = Publisher::new(pool);
//! publisher.publish_change(&event).await?;
//!
//! let subscriber = SubscriberBuilder::new().redis_url("redis://127.0.0.1:6379").build().await?;
//! let feed = RedisChangeFeed::new(subscriber);
//! let stream = feed.subscribe(Topic::Likes).await?;
//! ```

pub mod feed;
pub mod pool;
pub mod pubsub;

// Re-export pool types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};

// Re-export pubsub types
pub use pubsub::{
    PubSubChannel, Publisher, ReceivedMessage, Subscriber, SubscriberBuilder, SubscriberConfig,
    SubscriberError, SubscriberResult, COMMENT_DELETES_CHANNEL, COMMENTS_PREFIX, LIKES_CHANNEL,
    NOTIFICATIONS_PREFIX,
};

pub use feed::RedisChangeFeed;

//! Redis Pub/Sub subscriber.
//!
//! One background connection serves every topic subscription in the
//! process. Channels are reference counted: several topics share
//! `comment_deletes`, and the Redis subscription is only dropped once the
//! last of them lets go.

use futures_util::StreamExt;
use parking_lot::Mutex;
use redis::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

use crew_core::ChangeEvent;

use crate::pool::redact_url;
use crate::pubsub::PubSubChannel;

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to parse event: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Channel closed")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Received message from Pub/Sub
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Channel the message was received on
    pub channel: PubSubChannel,
    /// Decoded change event (if the payload was valid)
    pub event: Option<ChangeEvent>,
    /// Raw payload
    pub payload: String,
}

impl ReceivedMessage {
    /// Create from raw Redis message
    fn from_redis(channel_name: &str, payload: String) -> Self {
        let event = match serde_json::from_str(&payload) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!(channel = %channel_name, error = %e, "Undecodable change payload");
                None
            }
        };

        Self {
            channel: PubSubChannel::parse(channel_name),
            event,
            payload,
        }
    }
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

impl From<&crew_common::RedisConfig> for SubscriberConfig {
    fn from(config: &crew_common::RedisConfig) -> Self {
        Self {
            redis_url: config.url.clone(),
            ..Self::default()
        }
    }
}

/// Live channel reference counts
#[derive(Debug, Default)]
struct ChannelRefs {
    counts: HashMap<String, usize>,
}

impl ChannelRefs {
    /// Take a reference on each channel; returns the ones not yet subscribed
    fn acquire(&mut self, channels: &[String]) -> Vec<String> {
        let mut fresh = Vec::new();
        for channel in channels {
            let count = self.counts.entry(channel.clone()).or_insert(0);
            *count += 1;
            if *count == 1 {
                fresh.push(channel.clone());
            }
        }
        fresh
    }

    /// Drop a reference on each channel; returns the ones nobody needs anymore
    fn release(&mut self, channels: &[String]) -> Vec<String> {
        let mut idle = Vec::new();
        for channel in channels {
            if let Some(count) = self.counts.get_mut(channel) {
                *count -= 1;
                if *count == 0 {
                    self.counts.remove(channel);
                    idle.push(channel.clone());
                }
            }
        }
        idle
    }

    fn names(&self) -> Vec<String> {
        self.counts.keys().cloned().collect()
    }
}

/// Commands for subscription management
#[derive(Debug)]
enum SubscriberCommand {
    Subscribe(Vec<String>),
    Unsubscribe(Vec<String>),
    Shutdown,
}

/// Redis Pub/Sub subscriber
pub struct Subscriber {
    refs: Arc<Mutex<ChannelRefs>>,
    /// Broadcast sender for messages
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
    /// Control channel for subscription management
    control_tx: mpsc::UnboundedSender<SubscriberCommand>,
}

impl Subscriber {
    /// Create a new subscriber and start the background listener
    pub fn new(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        let refs = Arc::new(Mutex::new(ChannelRefs::default()));

        tokio::spawn(Self::listener_loop(
            config,
            refs.clone(),
            broadcast_tx.clone(),
            control_rx,
        ));

        Self {
            refs,
            broadcast_tx,
            control_tx,
        }
    }

    /// Background listener loop
    async fn listener_loop(
        config: SubscriberConfig,
        refs: Arc<Mutex<ChannelRefs>>,
        broadcast_tx: broadcast::Sender<ReceivedMessage>,
        mut control_rx: mpsc::UnboundedReceiver<SubscriberCommand>,
    ) {
        loop {
            match Self::run_listener(&config, &refs, &broadcast_tx, &mut control_rx).await {
                Ok(()) => {
                    tracing::info!("Subscriber shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Subscriber error, reconnecting...");
                    tokio::time::sleep(tokio::time::Duration::from_millis(
                        config.reconnect_delay_ms,
                    ))
                    .await;
                }
            }
        }
    }

    /// Run the listener until error or shutdown
    async fn run_listener(
        config: &SubscriberConfig,
        refs: &Arc<Mutex<ChannelRefs>>,
        broadcast_tx: &broadcast::Sender<ReceivedMessage>,
        control_rx: &mut mpsc::UnboundedReceiver<SubscriberCommand>,
    ) -> SubscriberResult<()> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        // Resubscribe everything still referenced (after a reconnect)
        let existing = refs.lock().names();
        for channel in &existing {
            pubsub.subscribe(channel).await?;
        }

        tracing::info!(
            url = %redact_url(&config.redis_url),
            channels = existing.len(),
            "Subscriber connected to Redis"
        );

        loop {
            let cmd = {
                let mut stream = pubsub.on_message();
                loop {
                    tokio::select! {
                        msg = stream.next() => {
                            let Some(msg) = msg else {
                                tracing::warn!("Pub/Sub stream ended");
                                return Err(SubscriberError::ChannelClosed);
                            };
                            let channel_name = msg.get_channel_name().to_string();
                            let payload: String = msg.get_payload().unwrap_or_default();

                            // No receivers is fine
                            let _ = broadcast_tx.send(ReceivedMessage::from_redis(&channel_name, payload));

                            tracing::trace!(channel = %channel_name, "Received Pub/Sub message");
                        }
                        cmd = control_rx.recv() => break cmd,
                    }
                }
            };

            match cmd {
                Some(SubscriberCommand::Subscribe(channels)) => {
                    for channel in &channels {
                        pubsub.subscribe(channel).await?;
                        tracing::debug!(channel = %channel, "Subscribed to channel");
                    }
                }
                Some(SubscriberCommand::Unsubscribe(channels)) => {
                    for channel in &channels {
                        pubsub.unsubscribe(channel).await?;
                        tracing::debug!(channel = %channel, "Unsubscribed from channel");
                    }
                }
                Some(SubscriberCommand::Shutdown) | None => return Ok(()),
            }
        }
    }

    /// Take a reference on channels, subscribing to any not yet live
    pub fn subscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();
        let fresh = self.refs.lock().acquire(&names);
        if fresh.is_empty() {
            return Ok(());
        }

        self.control_tx
            .send(SubscriberCommand::Subscribe(fresh))
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Drop a reference on channels, unsubscribing from any no longer needed
    pub fn unsubscribe(&self, channels: &[PubSubChannel]) -> SubscriberResult<()> {
        let names: Vec<String> = channels.iter().map(PubSubChannel::name).collect();
        let idle = self.refs.lock().release(&names);
        if idle.is_empty() {
            return Ok(());
        }

        self.control_tx
            .send(SubscriberCommand::Unsubscribe(idle))
            .map_err(|_| SubscriberError::ChannelClosed)
    }

    /// Get a receiver for broadcast messages
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Get currently subscribed channels
    pub fn subscribed_channels(&self) -> Vec<String> {
        self.refs.lock().names()
    }

    /// Shutdown the subscriber
    pub fn shutdown(&self) -> SubscriberResult<()> {
        self.control_tx
            .send(SubscriberCommand::Shutdown)
            .map_err(|_| SubscriberError::ChannelClosed)
    }
}

/// Builder for subscriber
pub struct SubscriberBuilder {
    config: SubscriberConfig,
    initial_channels: Vec<PubSubChannel>,
}

impl SubscriberBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SubscriberConfig::default(),
            initial_channels: Vec::new(),
        }
    }

    /// Start from crew-common Redis settings
    #[must_use]
    pub fn from_config(config: &crew_common::RedisConfig) -> Self {
        Self {
            config: SubscriberConfig::from(config),
            initial_channels: Vec::new(),
        }
    }

    /// Set Redis URL
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    /// Set broadcast buffer size
    #[must_use]
    pub fn broadcast_buffer(mut self, size: usize) -> Self {
        self.config.broadcast_buffer = size;
        self
    }

    /// Set reconnection delay
    #[must_use]
    pub fn reconnect_delay_ms(mut self, delay: u64) -> Self {
        self.config.reconnect_delay_ms = delay;
        self
    }

    /// Add initial channel subscription
    #[must_use]
    pub fn subscribe(mut self, channel: PubSubChannel) -> Self {
        self.initial_channels.push(channel);
        self
    }

    /// Build and start the subscriber
    pub fn build(self) -> SubscriberResult<Subscriber> {
        let subscriber = Subscriber::new(self.config);

        if !self.initial_channels.is_empty() {
            subscriber.subscribe(&self.initial_channels)?;
        }

        Ok(subscriber)
    }
}

impl Default for SubscriberBuilder {
    fn default() -> Self {
        Self::new()
    }
}

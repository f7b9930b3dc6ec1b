//! # crew-relay
//!
//! Forwards row changes announced by the database triggers to the Redis
//! channels the change feed subscribes to.

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crew_cache::{Publisher, RedisPool, RedisPoolError};
use crew_common::{AppConfig, AppError};
use crew_core::{ChangeEvent, Table};
use crew_db::{ChangeListener, ListenerError};

/// Where change events come from
#[async_trait]
pub trait EventSource: Send {
    /// Next event; `None` once the source is exhausted
    async fn next_event(&mut self) -> Option<Result<ChangeEvent, ListenerError>>;
}

/// Where change events go
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Forward one event, returning how many subscribers received it
    async fn forward(&self, event: &ChangeEvent) -> Result<u32, RedisPoolError>;
}

#[async_trait]
impl EventSource for ChangeListener {
    async fn next_event(&mut self) -> Option<Result<ChangeEvent, ListenerError>> {
        Some(self.recv().await)
    }
}

#[async_trait]
impl EventSink for Publisher {
    async fn forward(&self, event: &ChangeEvent) -> Result<u32, RedisPoolError> {
        self.publish_change(event).await
    }
}

/// Counters reported when the relay stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub forwarded: u64,
    pub skipped: u64,
    pub failed: u64,
}

/// Pumps events from a source into a sink
pub struct Relay<S, K> {
    source: S,
    sink: K,
    stats: RelayStats,
}

impl<S: EventSource, K: EventSink> Relay<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self {
            source,
            sink,
            stats: RelayStats::default(),
        }
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    /// Run until the source ends or fails
    ///
    /// Undecodable payloads and failed publishes cost only that event; a
    /// broken source stops the relay.
    pub async fn run(&mut self) -> Result<RelayStats, AppError> {
        while let Some(next) = self.source.next_event().await {
            match next {
                Ok(event) => self.forward(&event).await,
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "Skipping malformed change payload");
                    self.stats.skipped += 1;
                }
                Err(e) => return Err(AppError::Database(e.to_string())),
            }
        }

        info!(
            forwarded = self.stats.forwarded,
            skipped = self.stats.skipped,
            failed = self.stats.failed,
            "Change source closed"
        );
        Ok(self.stats)
    }

    async fn forward(&mut self, event: &ChangeEvent) {
        match self.sink.forward(event).await {
            Ok(receivers) => {
                debug!(event_type = event.event_type(), receivers, "Change forwarded");
                self.stats.forwarded += 1;
            }
            Err(e) => {
                warn!(event_type = event.event_type(), error = %e, "Failed to publish change");
                self.stats.failed += 1;
            }
        }
    }
}

/// Connect to PostgreSQL and Redis and relay until interrupted
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = crew_db::create_pool(&crew_db::DatabaseConfig::from(&config.database))
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    crew_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    for table in [Table::Comments, Table::Likes] {
        crew_db::set_full_delete_payloads(&pool, table, config.social.full_delete_payloads)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
    }

    crew_db::set_notify_channel(&pool, &config.relay.notify_channel)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let listener = ChangeListener::connect(&pool, &config.relay.notify_channel)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    info!("Connecting to Redis...");
    let redis = RedisPool::from_config(&config.redis).map_err(|e| AppError::Cache(e.to_string()))?;
    redis
        .health_check()
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?;

    let mut relay = Relay::new(listener, Publisher::new(redis));
    info!(channel = %config.relay.notify_channel, "Relay started");

    tokio::select! {
        result = relay.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    let stats = relay.stats();
    info!(
        forwarded = stats.forwarded,
        skipped = stats.skipped,
        failed = stats.failed,
        "Relay stopped"
    );
    Ok(())
}

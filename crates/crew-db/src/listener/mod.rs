//! PostgreSQL `LISTEN` client for row change events
//!
//! The triggers installed by the migrations publish every INSERT/DELETE on
//! `comments`, `likes` and `notifications` as a JSON-encoded
//! [`ChangeEvent`] on a NOTIFY channel. This module decodes them.

use sqlx::postgres::PgListener;
use sqlx::PgPool;
use tracing::{debug, info};

use crew_core::ChangeEvent;

/// Listener errors
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Malformed change payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ListenerError {
    /// A bad payload only loses that event; the connection is still usable
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Decode(_))
    }
}

/// Decode one NOTIFY payload
pub fn decode_notification(payload: &str) -> Result<ChangeEvent, ListenerError> {
    Ok(serde_json::from_str(payload)?)
}

/// Receives change events from a NOTIFY channel
pub struct ChangeListener {
    listener: PgListener,
    channel: String,
}

impl ChangeListener {
    /// Open a dedicated connection from `pool` and LISTEN on `channel`
    pub async fn connect(pool: &PgPool, channel: &str) -> Result<Self, ListenerError> {
        let mut listener = PgListener::connect_with(pool).await?;
        listener.listen(channel).await?;

        info!(channel = %channel, "Listening for row changes");

        Ok(Self {
            listener,
            channel: channel.to_string(),
        })
    }

    /// Channel being listened on
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Wait for the next change event
    ///
    /// A lost connection is re-established by the underlying listener;
    /// notifications sent while disconnected are not replayed.
    pub async fn recv(&mut self) -> Result<ChangeEvent, ListenerError> {
        let notification = self.listener.recv().await?;
        debug!(
            channel = notification.channel(),
            bytes = notification.payload().len(),
            "Notification received"
        );
        decode_notification(notification.payload())
    }
}

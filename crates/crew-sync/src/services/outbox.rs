//! Notification outbox
//!
//! Notifications are a side effect of likes and comments. Services enqueue
//! drafts and return immediately; an [`OutboxWorker`] persists them. A
//! failed notification is logged and dropped, never surfaced to the member.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crew_core::{NewNotification, NotificationRepository};

/// Receiving side of the outbox, handed to the worker
pub type PendingNotifications = mpsc::UnboundedReceiver<NewNotification>;

/// Sending side of the outbox
#[derive(Debug, Clone)]
pub struct NotificationOutbox {
    tx: mpsc::UnboundedSender<NewNotification>,
}

impl NotificationOutbox {
    /// Create an outbox and the queue its worker drains
    pub fn channel() -> (Self, PendingNotifications) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue a notification for delivery
    pub fn enqueue(&self, notification: NewNotification) {
        let kind = notification.kind();
        if self.tx.send(notification).is_err() {
            warn!(kind = %kind, "Notification outbox closed, dropping notification");
        }
    }
}

/// Persists queued notifications
pub struct OutboxWorker {
    rx: PendingNotifications,
    repo: Arc<dyn NotificationRepository>,
}

impl OutboxWorker {
    pub fn new(rx: PendingNotifications, repo: Arc<dyn NotificationRepository>) -> Self {
        Self { rx, repo }
    }

    /// Persist everything queued so far without waiting for more
    ///
    /// Returns how many notifications were stored.
    pub async fn process_pending(&mut self) -> usize {
        let mut stored = 0;
        while let Ok(notification) = self.rx.try_recv() {
            if self.deliver(&notification).await {
                stored += 1;
            }
        }
        stored
    }

    /// Drain the queue until every outbox handle is dropped
    pub async fn run(mut self) {
        info!("Notification outbox worker started");
        while let Some(notification) = self.rx.recv().await {
            self.deliver(&notification).await;
        }
        info!("Notification outbox worker stopped");
    }

    /// Run the worker on the current runtime
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn deliver(&self, notification: &NewNotification) -> bool {
        match self.repo.create(notification).await {
            Ok(stored) => {
                debug!(
                    notification_id = %stored.id,
                    receiver_id = %stored.receiver_id,
                    kind = %stored.kind,
                    "Notification stored"
                );
                true
            }
            Err(e) => {
                warn!(
                    receiver_id = %notification.receiver_id(),
                    kind = %notification.kind(),
                    error = %e,
                    "Failed to store notification"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{FailPoint, MemoryBackend};
    use crew_core::{LikeTarget, UserId};

    fn like_from(actor: &str) -> NewNotification {
        NewNotification::like(UserId::new("owner"), UserId::new(actor), &LikeTarget::photo("p1"))
            .unwrap()
    }

    #[tokio::test]
    async fn test_process_pending_persists_queue() {
        let backend = Arc::new(MemoryBackend::new());
        let (outbox, rx) = NotificationOutbox::channel();
        let mut worker = OutboxWorker::new(rx, backend.clone());

        outbox.enqueue(like_from("u1"));
        outbox.enqueue(like_from("u2"));

        assert_eq!(worker.process_pending().await, 2);
        assert_eq!(backend.notifications_for(&UserId::new("owner")).len(), 2);
        assert_eq!(worker.process_pending().await, 0);
    }

    #[tokio::test]
    async fn test_failure_is_swallowed() {
        let backend = Arc::new(MemoryBackend::new());
        backend.fail_next(FailPoint::CreateNotification);
        let (outbox, rx) = NotificationOutbox::channel();
        let mut worker = OutboxWorker::new(rx, backend.clone());

        outbox.enqueue(like_from("u1"));
        outbox.enqueue(like_from("u2"));

        assert_eq!(worker.process_pending().await, 1);
    }

    #[tokio::test]
    async fn test_run_stops_when_outbox_dropped() {
        let backend = Arc::new(MemoryBackend::new());
        let (outbox, rx) = NotificationOutbox::channel();
        let handle = OutboxWorker::new(rx, backend.clone()).spawn();

        outbox.enqueue(like_from("u1"));
        drop(outbox);
        handle.await.unwrap();

        assert_eq!(backend.notifications_for(&UserId::new("owner")).len(), 1);
    }
}

//! Integration test utilities for the sync layer
//!
//! Several member sessions share one in-memory backend, so a write made
//! in one session reaches the others through the change feed exactly as
//! it would between two clients.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::task::JoinHandle;

use crew_core::{MemberProfile, NotificationRepository, UserId};
use crew_sync::{MemoryBackend, NotificationOutbox, OutboxWorker, Reconciler, SyncContext};

/// Longest a scenario waits for the feed to settle
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// One signed-in member: a context, its reconciler and its outbox worker
pub struct Session {
    pub reconciler: Reconciler,
    worker: JoinHandle<()>,
}

impl Session {
    /// Sign `user_id` in against `backend`, registering their profile
    pub fn start(backend: &Arc<MemoryBackend>, user_id: &str, name: &str) -> Result<Self> {
        backend.add_member(MemberProfile::new(UserId::new(user_id), name));

        let (outbox, pending) = NotificationOutbox::channel();
        let ctx = SyncContext::builder()
            .user_id(user_id)
            .backend(backend.clone())
            .outbox(outbox)
            .build()?;

        let repo: Arc<dyn NotificationRepository> = backend.clone();
        let worker = OutboxWorker::new(pending, repo).spawn();

        Ok(Self {
            reconciler: Reconciler::new(ctx),
            worker,
        })
    }

    pub fn ctx(&self) -> &SyncContext {
        self.reconciler.context()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// Fresh shared backend
pub fn backend() -> Arc<MemoryBackend> {
    Arc::new(MemoryBackend::new())
}

/// Poll `condition` until it holds or [`SETTLE_TIMEOUT`] passes
pub async fn wait_until(condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Give spawned consumers a chance to drain what is already queued
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

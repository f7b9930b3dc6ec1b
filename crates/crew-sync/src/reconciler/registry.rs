//! Subscription registry
//!
//! At most one live subscription per (consumer, resource). Registering a
//! key that is already live tears the old subscription down first: its
//! task is aborted and its liveness flag cleared, so any fetch it still
//! has in flight is discarded when it lands.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;

/// Which consumer a subscription feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConsumerKind {
    CommentList,
    CommentCount,
    Likes,
    Notifications,
}

impl ConsumerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CommentList => "comment_list",
            Self::CommentCount => "comment_count",
            Self::Likes => "likes",
            Self::Notifications => "notifications",
        }
    }
}

/// Identity of one subscription
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    pub consumer: ConsumerKind,
    pub resource: String,
}

impl SubscriptionKey {
    pub fn new(consumer: ConsumerKind, resource: impl Into<String>) -> Self {
        Self {
            consumer,
            resource: resource.into(),
        }
    }
}

impl fmt::Display for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.consumer.as_str(), self.resource)
    }
}

/// Handle to one registration; goes dead on teardown
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    key: SubscriptionKey,
    live: Arc<AtomicBool>,
}

impl SubscriptionHandle {
    fn new(key: SubscriptionKey) -> Self {
        Self {
            key,
            live: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn key(&self) -> &SubscriptionKey {
        &self.key
    }

    /// False once the subscription has been torn down or replaced
    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    fn cancel(&self) {
        self.live.store(false, Ordering::Release);
    }

    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.live, &other.live)
    }
}

struct Entry {
    handle: SubscriptionHandle,
    task: Option<JoinHandle<()>>,
}

impl Entry {
    fn shut(self) {
        self.handle.cancel();
        if let Some(task) = self.task {
            task.abort();
        }
    }
}

/// Live subscriptions keyed by (consumer, resource)
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: DashMap<SubscriptionKey, Entry>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `key`, tearing down whatever held it
    pub fn register(&self, key: SubscriptionKey) -> SubscriptionHandle {
        let handle = SubscriptionHandle::new(key.clone());
        let previous = self.entries.insert(
            key,
            Entry {
                handle: handle.clone(),
                task: None,
            },
        );
        if let Some(previous) = previous {
            tracing::debug!(key = %handle.key, "Replacing subscription");
            previous.shut();
        }
        handle
    }

    /// Attach the task driving `handle`; aborts it if `handle` lost its key
    pub fn attach(&self, handle: &SubscriptionHandle, task: JoinHandle<()>) {
        if let Some(mut entry) = self.entries.get_mut(&handle.key) {
            if entry.handle.same(handle) && handle.is_live() {
                entry.task = Some(task);
                return;
            }
        }
        task.abort();
    }

    /// Tear down `handle` only if it still owns its key
    pub fn release(&self, handle: &SubscriptionHandle) {
        handle.cancel();
        if let Some((_, entry)) = self
            .entries
            .remove_if(&handle.key, |_, entry| entry.handle.same(handle))
        {
            entry.shut();
        }
    }

    /// Tear down whatever holds `key`
    pub fn teardown(&self, key: &SubscriptionKey) -> bool {
        match self.entries.remove(key) {
            Some((_, entry)) => {
                entry.shut();
                true
            }
            None => false,
        }
    }

    pub fn teardown_all(&self) {
        let keys: Vec<_> = self.entries.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            self.teardown(&key);
        }
    }

    pub fn is_active(&self, key: &SubscriptionKey) -> bool {
        self.entries.get(key).is_some_and(|e| e.handle.is_live())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

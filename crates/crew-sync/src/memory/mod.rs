//! In-process backend
//!
//! Implements every persistence port and the change feed over plain
//! collections, mirroring the PostgreSQL schema's constraints and the
//! change triggers' payloads. Writes made through the `seed_*` and
//! `remove_*` helpers behave like writes from another session: they emit
//! the same change events a repository write does.

mod repositories;

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use tokio::sync::broadcast::{self, error::RecvError};

use crew_core::{
    ChangeEvent, ChangeFeed, ChangeStream, Comment, CommentId, DomainError, Like, LikeId,
    LikeTarget, MemberProfile, ModuleId, NewNotification, Notification, NotificationId,
    RepoResult, RowPayload, Topic, UserId,
};

const FEED_CAPACITY: usize = 1024;

/// Operations that can be made to fail once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailPoint {
    CreateComment,
    DeleteComment,
    CreateLike,
    DeleteLike,
    CreateNotification,
    MarkRead,
}

#[derive(Debug, Default)]
struct Tables {
    members: HashMap<UserId, MemberProfile>,
    comments: Vec<Comment>,
    likes: Vec<Like>,
    notifications: Vec<Notification>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing creation time, so ordering by it is total
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + chrono::Duration::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn profile(&self, id: &UserId) -> Option<MemberProfile> {
        self.members.get(id).cloned()
    }

    fn hydrate_comment(&self, comment: &Comment) -> Comment {
        Comment {
            author: self.profile(&comment.author_id),
            ..comment.clone()
        }
    }

    fn hydrate_notification(&self, notification: &Notification) -> Notification {
        Notification {
            actor: self.profile(&notification.actor_id),
            ..notification.clone()
        }
    }

    fn like_count(&self, target: &LikeTarget) -> i64 {
        self.likes
            .iter()
            .filter(|l| l.target_id == target.target_id && l.target_type == target.target_type)
            .count() as i64
    }
}

/// In-memory implementation of every repository and the change feed
pub struct MemoryBackend {
    tables: Mutex<Tables>,
    events: broadcast::Sender<ChangeEvent>,
    full_delete_payloads: AtomicBool,
    failures: Mutex<HashSet<FailPoint>>,
    read_delay: Mutex<Option<Duration>>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tables = self.tables.lock();
        f.debug_struct("MemoryBackend")
            .field("comments", &tables.comments.len())
            .field("likes", &tables.likes.len())
            .field("notifications", &tables.notifications.len())
            .finish()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            tables: Mutex::new(Tables::default()),
            events,
            full_delete_payloads: AtomicBool::new(false),
            failures: Mutex::new(HashSet::new()),
            read_delay: Mutex::new(None),
        }
    }

    // =========================================================================
    // Behaviour switches
    // =========================================================================

    /// Whether DELETE events carry the whole old row
    pub fn set_full_delete_payloads(&self, enabled: bool) {
        self.full_delete_payloads.store(enabled, Ordering::SeqCst);
    }

    /// Make the next call of `point` fail with a transport error
    pub fn fail_next(&self, point: FailPoint) {
        self.failures.lock().insert(point);
    }

    /// Delay every read by `delay`
    pub fn set_read_delay(&self, delay: Option<Duration>) {
        *self.read_delay.lock() = delay;
    }

    /// Push an arbitrary event to subscribers
    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    // =========================================================================
    // Writes from elsewhere
    // =========================================================================

    pub fn add_member(&self, profile: MemberProfile) {
        self.tables.lock().members.insert(profile.id.clone(), profile);
    }

    /// Store a comment row directly and emit its insert event
    ///
    /// Bypasses validation; the returned row is hydrated.
    pub fn seed_comment(
        &self,
        author_id: &UserId,
        module_id: &ModuleId,
        content: &str,
        parent_id: Option<&CommentId>,
    ) -> Comment {
        let (row, hydrated) = {
            let mut tables = self.tables.lock();
            let mut row = Comment::new(
                CommentId::generate(),
                module_id.clone(),
                author_id.clone(),
                content.to_string(),
            );
            row.parent_id = parent_id.cloned();
            row.created_at = tables.next_timestamp();
            tables.comments.push(row.clone());
            let hydrated = tables.hydrate_comment(&row);
            (row, hydrated)
        };
        self.publish(ChangeEvent::CommentInserted(row));
        hydrated
    }

    /// Delete a comment (and its replies) as its author would from another session
    pub fn remove_comment_row(&self, id: &CommentId) -> bool {
        let removed = self.tables.lock().remove_comment_cascade(id);
        let found = !removed.is_empty();
        self.publish_comment_deletes(removed);
        found
    }

    /// Store a like directly and emit its insert event
    pub fn seed_like(&self, user_id: &UserId, target: &LikeTarget) -> Like {
        let like = {
            let mut tables = self.tables.lock();
            let mut like = Like::new(LikeId::generate(), user_id.clone(), target.clone());
            like.created_at = tables.next_timestamp();
            tables.likes.push(like.clone());
            like
        };
        self.publish(ChangeEvent::LikeInserted(like.clone()));
        like
    }

    /// Delete a like directly and emit its delete event
    pub fn remove_like(&self, user_id: &UserId, target: &LikeTarget) -> bool {
        let removed = self.tables.lock().remove_like(user_id, target);
        match removed {
            Some(like) => {
                self.publish(ChangeEvent::LikeDeleted(self.delete_payload(like, |l| {
                    l.id.as_str().to_string()
                })));
                true
            }
            None => false,
        }
    }

    /// Store a notification directly and emit its insert event
    pub fn seed_notification(&self, notification: NewNotification) -> Notification {
        let (row, hydrated) = self.tables.lock().insert_notification(notification);
        self.publish(ChangeEvent::NotificationInserted(row));
        hydrated
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Every stored comment row, without joins
    pub fn comment_rows(&self) -> Vec<Comment> {
        self.tables.lock().comments.clone()
    }

    pub fn like_count(&self, target: &LikeTarget) -> i64 {
        self.tables.lock().like_count(target)
    }

    /// Stored notifications for a receiver, newest-first
    pub fn notifications_for(&self, receiver_id: &UserId) -> Vec<Notification> {
        let tables = self.tables.lock();
        let mut items: Vec<_> = tables
            .notifications
            .iter()
            .filter(|n| n.is_for(receiver_id))
            .map(|n| tables.hydrate_notification(n))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    pub fn unread_for(&self, receiver_id: &UserId) -> i64 {
        self.tables
            .lock()
            .notifications
            .iter()
            .filter(|n| n.is_for(receiver_id) && !n.is_read)
            .count() as i64
    }

    // =========================================================================
    // Internals shared with the repository impls
    // =========================================================================

    fn check(&self, point: FailPoint) -> RepoResult<()> {
        if self.failures.lock().remove(&point) {
            return Err(DomainError::TransportError(format!("injected failure: {point:?}")));
        }
        Ok(())
    }

    async fn pause(&self) {
        let delay = *self.read_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn delete_payload<T>(&self, row: T, id: impl Fn(&T) -> String) -> RowPayload<T> {
        if self.full_delete_payloads.load(Ordering::SeqCst) {
            RowPayload::full(row)
        } else {
            RowPayload::partial(id(&row))
        }
    }

    fn publish_comment_deletes(&self, removed: Vec<Comment>) {
        for row in removed {
            let payload = self.delete_payload(row, |c| c.id.as_str().to_string());
            self.publish(ChangeEvent::CommentDeleted(payload));
        }
    }
}

impl Tables {
    /// Remove a comment and, for a top-level one, its replies; replies first
    fn remove_comment_cascade(&mut self, id: &CommentId) -> Vec<Comment> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.comments)
            .into_iter()
            .partition(|c| c.id == *id || c.parent_id.as_ref() == Some(id));
        self.comments = kept;

        let (mut ordered, parents): (Vec<_>, Vec<_>) =
            removed.into_iter().partition(Comment::is_reply);
        ordered.extend(parents);
        ordered
    }

    fn remove_like(&mut self, user_id: &UserId, target: &LikeTarget) -> Option<Like> {
        let pos = self.likes.iter().position(|l| {
            l.user_id == *user_id
                && l.target_id == target.target_id
                && l.target_type == target.target_type
        })?;
        Some(self.likes.remove(pos))
    }

    fn insert_notification(&mut self, new: NewNotification) -> (Notification, Notification) {
        let mut row = Notification::from_new(NotificationId::generate(), new);
        row.created_at = self.next_timestamp();
        self.notifications.push(row.clone());
        let hydrated = self.hydrate_notification(&row);
        (row, hydrated)
    }
}

#[async_trait]
impl ChangeFeed for MemoryBackend {
    async fn subscribe(&self, topic: Topic) -> RepoResult<ChangeStream> {
        let rx = self.events.subscribe();

        let events = stream::unfold((rx, topic), |(mut rx, topic)| async move {
            loop {
                match rx.recv().await {
                    Ok(event) if topic.accepts(&event) => return Some((event, (rx, topic))),
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(topic = %topic, skipped, "Memory feed lagged");
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        Ok(events.boxed())
    }
}

//! Interaction store
//!
//! Single source of truth for what the UI shows: like state per target,
//! comment threads and counts per module, and the notification inbox.
//!
//! The store never fetches. Every operation takes the lock for the
//! duration of one synchronous update, so it is safe to share between
//! tasks; callers must not (and cannot) hold it across an await.

mod claim;
mod inbox;
mod thread;

pub use claim::LikeMutation;
pub use inbox::NotificationInbox;
pub use thread::CommentThread;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crew_core::{
    Comment, CommentId, LikeDirection, LikeState, LikeTarget, ModuleId, Notification,
    NotificationId,
};

#[derive(Debug, Default)]
struct StoreState {
    likes: HashMap<LikeTarget, LikeState>,
    likes_in_flight: HashSet<LikeTarget>,
    /// Bumped whenever the current member's own like state is written
    like_epochs: HashMap<LikeTarget, u64>,
    threads: HashMap<ModuleId, CommentThread>,
    comment_counts: HashMap<ModuleId, i64>,
    inbox: NotificationInbox,
}

impl StoreState {
    fn touch_like(&mut self, target: &LikeTarget) {
        *self.like_epochs.entry(target.clone()).or_default() += 1;
    }

    fn apply_like_delta(&mut self, target: &LikeTarget, direction: LikeDirection) -> LikeState {
        self.touch_like(target);
        let entry = self.likes.entry(target.clone()).or_default();
        entry.count += direction.delta();
        entry.has_liked = !entry.has_liked;
        *entry
    }
}

/// Shared handle to the interaction state; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct InteractionStore {
    state: Arc<RwLock<StoreState>>,
}

impl InteractionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Likes
    // =========================================================================

    /// Current like state; `{0, false}` for a target never primed
    pub fn like_state(&self, target: &LikeTarget) -> LikeState {
        self.state
            .read()
            .likes
            .get(target)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_like_primed(&self, target: &LikeTarget) -> bool {
        self.state.read().likes.contains_key(target)
    }

    /// Seed a target from a fetch
    pub fn prime_like(&self, target: LikeTarget, state: LikeState) {
        let mut guard = self.state.write();
        guard.touch_like(&target);
        guard.likes.insert(target, state);
    }

    /// Optimistic toggle step: count moves by one and `has_liked` flips
    ///
    /// Applying a direction and then its inverse restores the prior state.
    pub fn apply_like_delta(&self, target: &LikeTarget, direction: LikeDirection) -> LikeState {
        self.state.write().apply_like_delta(target, direction)
    }

    /// Another member's like or unlike; leaves `has_liked` alone
    ///
    /// Unprimed targets are ignored. Returns whether the count moved.
    pub fn adjust_like_count(&self, target: &LikeTarget, direction: LikeDirection) -> bool {
        let mut state = self.state.write();
        let Some(entry) = state.likes.get_mut(target) else {
            return false;
        };
        let next = (entry.count + direction.delta()).max(0);
        let changed = next != entry.count;
        entry.count = next;
        changed
    }

    /// Write stamp of a target's own like state, taken before a count fetch
    pub fn like_epoch(&self, target: &LikeTarget) -> u64 {
        self.state
            .read()
            .like_epochs
            .get(target)
            .copied()
            .unwrap_or_default()
    }

    /// Replace a primed target's count with a value fetched at `epoch`
    ///
    /// Refused while a toggle is outstanding or if one ran since `epoch`:
    /// the fetched count may predate it. Returns whether the count was set.
    pub fn refresh_like_count(&self, target: &LikeTarget, count: i64, epoch: u64) -> bool {
        let mut state = self.state.write();
        let current = state.like_epochs.get(target).copied().unwrap_or_default();
        if current != epoch || state.likes_in_flight.contains(target) {
            return false;
        }
        match state.likes.get_mut(target) {
            Some(entry) => {
                entry.count = count.max(0);
                true
            }
            None => false,
        }
    }

    pub fn primed_like_targets(&self) -> Vec<LikeTarget> {
        self.state.read().likes.keys().cloned().collect()
    }

    /// Claim the target for a toggle; `None` while another toggle is outstanding
    ///
    /// The claim is released when dropped, see [`LikeMutation`].
    pub fn begin_like_mutation(&self, target: &LikeTarget) -> Option<LikeMutation> {
        let mut state = self.state.write();
        if !state.likes_in_flight.insert(target.clone()) {
            return None;
        }
        state.touch_like(target);
        Some(LikeMutation::new(self.clone(), target.clone()))
    }

    pub fn is_like_in_flight(&self, target: &LikeTarget) -> bool {
        self.state.read().likes_in_flight.contains(target)
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Merge a comment by id
    ///
    /// A top-level comment opens the module's thread if none is held. A
    /// reply whose parent is not held is dropped.
    pub fn upsert_comment(&self, comment: Comment) -> bool {
        let mut state = self.state.write();
        if comment.is_reply() {
            return match state.threads.get_mut(&comment.module_id) {
                Some(thread) => thread.upsert(comment),
                None => false,
            };
        }
        state
            .threads
            .entry(comment.module_id.clone())
            .or_default()
            .upsert(comment)
    }

    /// Remove a comment from every held thread; absent ids are a no-op
    pub fn remove_comment(&self, id: &CommentId) -> bool {
        let mut state = self.state.write();
        state
            .threads
            .values_mut()
            .fold(false, |changed, thread| thread.remove(id) || changed)
    }

    /// Replace a module's thread with fetched comments
    pub fn prime_thread(&self, module_id: ModuleId, comments: Vec<Comment>) {
        self.state
            .write()
            .threads
            .insert(module_id, CommentThread::from_comments(comments));
    }

    /// Held comments of a module, top-level newest-first
    pub fn comments(&self, module_id: &ModuleId) -> Vec<Comment> {
        self.state
            .read()
            .threads
            .get(module_id)
            .map(|t| t.comments().to_vec())
            .unwrap_or_default()
    }

    pub fn has_thread(&self, module_id: &ModuleId) -> bool {
        self.state.read().threads.contains_key(module_id)
    }

    pub fn contains_comment(&self, module_id: &ModuleId, id: &CommentId) -> bool {
        self.state
            .read()
            .threads
            .get(module_id)
            .is_some_and(|t| t.contains(id))
    }

    /// A held top-level comment (with its replies)
    pub fn find_top_level_comment(&self, module_id: &ModuleId, id: &CommentId) -> Option<Comment> {
        self.state
            .read()
            .threads
            .get(module_id)
            .and_then(|t| t.find_top_level(id).cloned())
    }

    /// Top-level comments plus replies held for a module
    pub fn thread_total(&self, module_id: &ModuleId) -> usize {
        self.state
            .read()
            .threads
            .get(module_id)
            .map_or(0, CommentThread::total)
    }

    pub fn drop_thread(&self, module_id: &ModuleId) {
        self.state.write().threads.remove(module_id);
    }

    // =========================================================================
    // Comment counts
    // =========================================================================

    pub fn set_comment_count(&self, module_id: ModuleId, count: i64) {
        self.state
            .write()
            .comment_counts
            .insert(module_id, count.max(0));
    }

    /// Move a primed count by `delta`; unprimed modules are ignored
    pub fn adjust_comment_count(&self, module_id: &ModuleId, delta: i64) -> bool {
        let mut state = self.state.write();
        let Some(count) = state.comment_counts.get_mut(module_id) else {
            return false;
        };
        *count = (*count + delta).max(0);
        true
    }

    pub fn comment_count(&self, module_id: &ModuleId) -> i64 {
        self.state
            .read()
            .comment_counts
            .get(module_id)
            .copied()
            .unwrap_or(0)
    }

    pub fn has_comment_count(&self, module_id: &ModuleId) -> bool {
        self.state.read().comment_counts.contains_key(module_id)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub fn prime_notifications(&self, notifications: Vec<Notification>, unread: i64) {
        self.state.write().inbox.prime(notifications, unread);
    }

    /// Merge by id; the badge moves only for a genuinely new unread row
    pub fn upsert_notification(&self, notification: Notification) -> bool {
        self.state.write().inbox.upsert(notification)
    }

    pub fn contains_notification(&self, id: &NotificationId) -> bool {
        self.state.read().inbox.contains(id)
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.state.read().inbox.items().to_vec()
    }

    pub fn mark_read(&self, id: &NotificationId) -> bool {
        self.state.write().inbox.mark_read(id)
    }

    pub fn mark_all_read(&self) -> usize {
        self.state.write().inbox.mark_all_read()
    }

    pub fn unread_count(&self) -> i64 {
        self.state.read().inbox.unread()
    }

    pub fn set_unread_count(&self, count: i64) {
        self.state.write().inbox.set_unread(count);
    }

    pub fn increment_unread(&self) {
        self.state.write().inbox.increment_unread();
    }

    pub fn clear_unread(&self) {
        self.state.write().inbox.clear_unread();
    }
}

//! Like toggle claim

use tracing::debug;

use crew_core::{LikeDirection, LikeState, LikeTarget};

use super::InteractionStore;

/// Exclusive claim on one target's like toggle
///
/// Dropping the claim releases the target. A delta applied through the
/// claim and never confirmed with [`settle`](Self::settle) is inverted on
/// drop, so an abandoned or failed toggle does not stay on screen.
#[derive(Debug)]
pub struct LikeMutation {
    store: InteractionStore,
    target: LikeTarget,
    pending: Option<LikeDirection>,
}

impl LikeMutation {
    pub(super) fn new(store: InteractionStore, target: LikeTarget) -> Self {
        Self {
            store,
            target,
            pending: None,
        }
    }

    pub fn target(&self) -> &LikeTarget {
        &self.target
    }

    /// Apply the optimistic delta; it stays pending until settled
    pub fn apply(&mut self, direction: LikeDirection) -> LikeState {
        self.pending = Some(direction);
        self.store.apply_like_delta(&self.target, direction)
    }

    /// The server agreed; keep what the store shows
    pub fn settle(&mut self) {
        self.pending = None;
    }
}

impl Drop for LikeMutation {
    fn drop(&mut self) {
        let mut state = self.store.state.write();
        if let Some(direction) = self.pending.take() {
            debug!(target = %self.target, direction = ?direction, "Unconfirmed like delta reverted");
            state.apply_like_delta(&self.target, direction.inverse());
        } else {
            state.touch_like(&self.target);
        }
        state.likes_in_flight.remove(&self.target);
    }
}

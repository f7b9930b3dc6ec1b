//! Like service
//!
//! Toggles are applied to the store before the server answers and undone
//! if it refuses.

use crew_core::{DomainError, LikeDirection, LikeState, LikeTarget, NewLike, NewNotification, UserId};
use tracing::{debug, info, instrument, warn};

use crate::store::LikeMutation;

use super::context::SyncContext;
use super::error::ServiceResult;

/// Like service
pub struct LikeService<'a> {
    ctx: &'a SyncContext,
}

impl<'a> LikeService<'a> {
    /// Create a new LikeService
    pub fn new(ctx: &'a SyncContext) -> Self {
        Self { ctx }
    }

    /// Fetch the authoritative count and own-like flag for a target
    #[instrument(skip(self), fields(target = %target))]
    pub async fn fetch(&self, target: &LikeTarget) -> ServiceResult<LikeState> {
        let count = self.ctx.like_repo().count(target).await?;
        let own = self.ctx.like_repo().find(self.ctx.user_id(), target).await?;
        Ok(LikeState::new(count, own.is_some()))
    }

    /// Fetch a target's state and seed the store with it
    pub async fn load(&self, target: &LikeTarget) -> ServiceResult<LikeState> {
        let state = self.fetch(target).await?;
        self.ctx.store().prime_like(target.clone(), state);
        Ok(state)
    }

    /// Toggle the current member's like on `target`
    ///
    /// The store reflects the new state before the server is asked. On
    /// failure the change is inverted and the error returned, and the same
    /// happens if this future is dropped before the server answers. A
    /// toggle issued while another one for the same target is outstanding
    /// is ignored and the current state returned.
    ///
    /// `owner` is whoever created the target; they are notified when the
    /// toggle turns the like on.
    #[instrument(skip(self), fields(target = %target, user_id = %self.ctx.user_id()))]
    pub async fn toggle(&self, target: &LikeTarget, owner: Option<&UserId>) -> ServiceResult<LikeState> {
        let store = self.ctx.store();
        let Some(mut claim) = store.begin_like_mutation(target) else {
            debug!("Like toggle already in flight");
            return Ok(store.like_state(target));
        };

        let user_id = self.ctx.user_id();
        let direction = store.like_state(target).toggle_direction();
        claim.apply(direction);

        let outcome = match direction {
            LikeDirection::On => self
                .ctx
                .like_repo()
                .create(&NewLike {
                    user_id: user_id.clone(),
                    target: target.clone(),
                })
                .await
                .map(|_| true),
            LikeDirection::Off => self.ctx.like_repo().delete(user_id, target).await,
        };

        match outcome {
            Ok(true) => {
                claim.settle();
                info!(direction = ?direction, "Like toggled");
                if direction == LikeDirection::On {
                    self.notify_owner(target, owner);
                }
                Ok(store.like_state(target))
            }
            // The server already agreed with the new state before we asked
            Ok(false) | Err(DomainError::LikeAlreadyExists) => {
                debug!(direction = ?direction, "Like state diverged, refetching");
                self.refetch(&mut claim).await
            }
            Err(e) => {
                // Dropping the unsettled claim reverts the delta
                warn!(direction = ?direction, error = %e, "Like toggle failed, rolling back");
                Err(e.into())
            }
        }
    }

    /// Replace the optimistic state with the server's; on failure the
    /// claim stays unsettled and reverts
    async fn refetch(&self, claim: &mut LikeMutation) -> ServiceResult<LikeState> {
        let state = self.fetch(claim.target()).await?;
        self.ctx.store().prime_like(claim.target().clone(), state);
        claim.settle();
        Ok(state)
    }

    fn notify_owner(&self, target: &LikeTarget, owner: Option<&UserId>) {
        let Some(owner) = owner else {
            return;
        };
        match NewNotification::like(owner.clone(), self.ctx.user_id().clone(), target) {
            Ok(notification) => self.ctx.outbox().enqueue(notification),
            Err(DomainError::SelfNotification) => {}
            Err(e) => warn!(error = %e, "Failed to build like notification"),
        }
    }
}

//! Comment count consumer
//!
//! Holds only a number, so a delete it cannot attribute to its module is
//! answered by refetching the count rather than guessing.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use crew_core::{ChangeEvent, Comment, CommentId, ModuleId, RowPayload, Topic};

use crate::services::{ServiceResult, SyncContext};

use super::{Consumer, ConsumerKind, SubscriptionHandle, SubscriptionKey};

/// Inserts seen since the count was last fetched
#[derive(Debug, Default)]
struct Tally {
    counted: HashSet<CommentId>,
    /// Rows created at or before this are inside the fetched count
    fetched_at: Option<DateTime<Utc>>,
}

/// Keeps one module's comment count (replies included) in step
pub struct CommentCountConsumer {
    ctx: SyncContext,
    module_id: ModuleId,
    tally: Mutex<Tally>,
}

impl CommentCountConsumer {
    pub fn new(ctx: SyncContext, module_id: ModuleId) -> Self {
        Self {
            ctx,
            module_id,
            tally: Mutex::new(Tally::default()),
        }
    }

    /// Replace the count with a fetched one and start a fresh tally
    fn rebase(&self, count: i64) {
        let mut tally = self.tally.lock();
        self.ctx.store().set_comment_count(self.module_id.clone(), count);
        tally.counted.clear();
        tally.fetched_at = Some(Utc::now());
    }

    async fn refetch(&self, handle: &SubscriptionHandle) {
        match self.ctx.comment_repo().count_by_module(&self.module_id).await {
            Ok(count) if handle.is_live() => self.rebase(count),
            Ok(_) => {}
            Err(e) => warn!(module_id = %self.module_id, error = %e, "Comment count refetch failed"),
        }
    }

    fn on_insert(&self, row: &Comment) {
        if row.module_id != self.module_id {
            return;
        }
        let mut tally = self.tally.lock();
        if tally.fetched_at.is_some_and(|at| row.created_at <= at) {
            debug!(comment_id = %row.id, "Comment already in fetched count");
            return;
        }
        if !tally.counted.insert(row.id.clone()) {
            debug!(comment_id = %row.id, "Duplicate comment insert not counted");
            return;
        }
        self.ctx.store().adjust_comment_count(&self.module_id, 1);
    }

    async fn on_delete(&self, payload: &RowPayload<Comment>, handle: &SubscriptionHandle) {
        match payload.module_id() {
            Some(module_id) if *module_id == self.module_id => {
                self.tally.lock().counted.remove(&CommentId::new(payload.id()));
                self.ctx.store().adjust_comment_count(&self.module_id, -1);
            }
            Some(_) => {}
            None => self.refetch(handle).await,
        }
    }
}

#[async_trait]
impl Consumer for CommentCountConsumer {
    fn key(&self) -> SubscriptionKey {
        SubscriptionKey::new(ConsumerKind::CommentCount, self.module_id.as_str())
    }

    fn topic(&self) -> Topic {
        Topic::ModuleComments(self.module_id.clone())
    }

    #[instrument(skip(self, handle), fields(module_id = %self.module_id))]
    async fn prime(&self, handle: &SubscriptionHandle) -> ServiceResult<()> {
        let count = self.ctx.comment_repo().count_by_module(&self.module_id).await?;
        if handle.is_live() {
            self.rebase(count);
        }
        Ok(())
    }

    async fn handle(&self, event: ChangeEvent, handle: &SubscriptionHandle) {
        match event {
            ChangeEvent::CommentInserted(row) if handle.is_live() => self.on_insert(&row),
            ChangeEvent::CommentDeleted(payload) if handle.is_live() => {
                self.on_delete(&payload, handle).await;
            }
            _ => {}
        }
    }
}

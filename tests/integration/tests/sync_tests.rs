//! Sync Integration Tests
//!
//! Two or more member sessions share one in-memory backend; every
//! assertion is about what one session's store shows after another
//! session (or the backend directly) writes.
//!
//! Run with: cargo test -p integration-tests --test sync_tests

use std::time::Duration;

use crew_core::{CommentId, LikeState, LikeTarget, ModuleId, UserId};
use crew_sync::{
    CommentService, ConsumerKind, FailPoint, LikeService, NotificationService, SubscriptionKey,
};
use integration_tests::{backend, settle, wait_until, Session};

fn gallery() -> ModuleId {
    ModuleId::new("gallery")
}

// ============================================================================
// Comment Tests
// ============================================================================

#[tokio::test]
async fn test_comment_from_other_session_reaches_list_and_count() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    let module = gallery();

    me.reconciler.watch_comments(module.clone()).await.unwrap();
    me.reconciler.watch_comment_count(module.clone()).await.unwrap();

    let posted = CommentService::new(other.ctx())
        .post(&module, "hello", None, None)
        .await
        .unwrap();

    let store = me.ctx().store();
    assert!(wait_until(|| store.thread_total(&module) == 1 && store.comment_count(&module) == 1).await);

    let held = store.comments(&module);
    assert_eq!(held[0].id, posted.id);
    assert_eq!(held[0].author.as_ref().map(|a| a.name.as_str()), Some("Min"));
}

#[tokio::test]
async fn test_replies_count_toward_module_total() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    let module = gallery();

    me.reconciler.watch_comments(module.clone()).await.unwrap();
    me.reconciler.watch_comment_count(module.clone()).await.unwrap();

    let parent = CommentService::new(me.ctx())
        .post(&module, "first", None, None)
        .await
        .unwrap();
    other.reconciler.watch_comments(module.clone()).await.unwrap();
    CommentService::new(other.ctx())
        .post(&module, "a reply", Some(&parent.id), None)
        .await
        .unwrap();

    let store = me.ctx().store();
    assert!(wait_until(|| store.comment_count(&module) == 2).await);
    assert!(wait_until(|| store.thread_total(&module) == 2).await);

    let held = store.comments(&module);
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].replies.len(), 1);
}

#[tokio::test]
async fn test_threaded_discussion_totals_match() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    let module = gallery();

    me.reconciler.watch_comments(module.clone()).await.unwrap();
    me.reconciler.watch_comment_count(module.clone()).await.unwrap();
    other.reconciler.watch_comments(module.clone()).await.unwrap();

    let comments = CommentService::new(other.ctx());
    let busy = comments.post(&module, "first", None, None).await.unwrap();
    comments.post(&module, "second", None, None).await.unwrap();
    for text in ["r1", "r2", "r3"] {
        comments.post(&module, text, Some(&busy.id), None).await.unwrap();
    }

    let store = me.ctx().store();
    assert!(wait_until(|| store.thread_total(&module) == 5 && store.comment_count(&module) == 5).await);

    let held = store.comments(&module);
    assert_eq!(held.len(), 2);
    let busy_held = held.iter().find(|c| c.id == busy.id).unwrap();
    assert_eq!(busy_held.replies.len(), 3);
}

#[tokio::test]
async fn test_cascading_partial_deletes_fall_back_to_refetch() {
    let backend = backend();
    let module = gallery();
    let parent = backend.seed_comment(&UserId::new("u2"), &module, "p", None);
    backend.seed_comment(&UserId::new("u3"), &module, "r", Some(&parent.id));
    backend.seed_comment(&UserId::new("u3"), &module, "kept", None);

    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    me.reconciler.watch_comments(module.clone()).await.unwrap();
    me.reconciler.watch_comment_count(module.clone()).await.unwrap();
    assert_eq!(me.ctx().store().comment_count(&module), 3);

    CommentService::new(other.ctx()).delete(&parent.id).await.unwrap();

    let store = me.ctx().store();
    assert!(wait_until(|| store.comment_count(&module) == 1 && store.thread_total(&module) == 1).await);
}

#[tokio::test]
async fn test_full_delete_payloads_adjust_only_their_module() {
    let backend = backend();
    backend.set_full_delete_payloads(true);
    let module = gallery();
    let mine = backend.seed_comment(&UserId::new("u2"), &module, "a", None);
    backend.seed_comment(&UserId::new("u2"), &module, "b", None);
    let elsewhere = backend.seed_comment(&UserId::new("u2"), &ModuleId::new("diary"), "c", None);

    let me = Session::start(&backend, "me", "Ana").unwrap();
    me.reconciler.watch_comment_count(module.clone()).await.unwrap();

    backend.remove_comment_row(&elsewhere.id);
    backend.remove_comment_row(&mine.id);

    let store = me.ctx().store();
    assert!(wait_until(|| store.comment_count(&module) == 1).await);
    settle().await;
    assert_eq!(store.comment_count(&module), 1);
}

#[tokio::test]
async fn test_failed_post_keeps_draft_and_store() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let module = gallery();
    me.reconciler.watch_comments(module.clone()).await.unwrap();

    backend.fail_next(FailPoint::CreateComment);
    let err = CommentService::new(me.ctx())
        .post(&module, "keep me", None, None)
        .await
        .unwrap_err();

    assert_eq!(err.draft, "keep me");
    assert!(err.error.is_transient());
    settle().await;
    assert_eq!(me.ctx().store().thread_total(&module), 0);
    assert!(backend.comment_rows().is_empty());
}

// ============================================================================
// Notification Tests
// ============================================================================

#[tokio::test]
async fn test_comment_on_my_content_notifies_me() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    me.reconciler.watch_notifications().await.unwrap();

    CommentService::new(other.ctx())
        .post(&gallery(), "nice shot", None, Some(&UserId::new("me")))
        .await
        .unwrap();

    let store = me.ctx().store();
    assert!(wait_until(|| store.unread_count() == 1).await);
    let held = store.notifications();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].actor.as_ref().map(|a| a.name.as_str()), Some("Min"));

    let updated = NotificationService::new(me.ctx()).mark_all_read().await.unwrap();
    assert_eq!(updated, 1);
    assert_eq!(store.unread_count(), 0);
    assert_eq!(backend.unread_for(&UserId::new("me")), 0);
}

#[tokio::test]
async fn test_reply_notifies_parent_author() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    let module = gallery();
    me.reconciler.watch_notifications().await.unwrap();
    other.reconciler.watch_comments(module.clone()).await.unwrap();

    let parent = CommentService::new(me.ctx())
        .post(&module, "my photo", None, None)
        .await
        .unwrap();
    let other_store = other.ctx().store();
    assert!(wait_until(|| other_store.contains_comment(&module, &parent.id)).await);

    CommentService::new(other.ctx())
        .post(&module, "love it", Some(&parent.id), None)
        .await
        .unwrap();

    let store = me.ctx().store();
    assert!(wait_until(|| store.unread_count() == 1).await);
    assert!(store.notifications()[0].content.starts_with("replied to your comment"));
}

#[tokio::test]
async fn test_acting_on_own_content_notifies_nobody() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let own = UserId::new("me");
    me.reconciler.watch_notifications().await.unwrap();

    CommentService::new(me.ctx())
        .post(&gallery(), "talking to myself", None, Some(&own))
        .await
        .unwrap();
    LikeService::new(me.ctx())
        .toggle(&LikeTarget::photo("p1"), Some(&own))
        .await
        .unwrap();

    settle().await;
    assert!(backend.notifications_for(&own).is_empty());
    assert_eq!(me.ctx().store().unread_count(), 0);
}

// ============================================================================
// Like Tests
// ============================================================================

#[tokio::test]
async fn test_like_counts_follow_other_sessions() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let other = Session::start(&backend, "u2", "Min").unwrap();
    let target = LikeTarget::anecdote("a1");

    me.reconciler.watch_likes().await.unwrap();
    me.reconciler.watch_notifications().await.unwrap();
    LikeService::new(me.ctx()).load(&target).await.unwrap();

    LikeService::new(other.ctx())
        .toggle(&target, Some(&UserId::new("me")))
        .await
        .unwrap();

    let store = me.ctx().store();
    assert!(wait_until(|| store.like_state(&target) == LikeState::new(1, false)).await);
    assert!(wait_until(|| store.unread_count() == 1).await);

    LikeService::new(other.ctx()).toggle(&target, None).await.unwrap();
    assert!(wait_until(|| store.like_state(&target) == LikeState::new(0, false)).await);
}

#[tokio::test]
async fn test_own_toggle_is_not_double_counted() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let target = LikeTarget::photo("p1");
    backend.seed_like(&UserId::new("u2"), &target);

    me.reconciler.watch_likes().await.unwrap();
    let service = LikeService::new(me.ctx());
    service.load(&target).await.unwrap();

    let on = service.toggle(&target, None).await.unwrap();
    assert_eq!(on, LikeState::new(2, true));
    settle().await;
    assert_eq!(me.ctx().store().like_state(&target), LikeState::new(2, true));

    let off = service.toggle(&target, None).await.unwrap();
    assert_eq!(off, LikeState::new(1, false));
    settle().await;
    assert_eq!(me.ctx().store().like_state(&target), LikeState::new(1, false));
    assert_eq!(backend.like_count(&target), 1);
}

#[tokio::test]
async fn test_rejected_toggle_rolls_back() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let target = LikeTarget::photo("p1");
    let service = LikeService::new(me.ctx());
    service.load(&target).await.unwrap();

    backend.fail_next(FailPoint::CreateLike);
    assert!(service.toggle(&target, None).await.is_err());

    assert_eq!(me.ctx().store().like_state(&target), LikeState::new(0, false));
    assert_eq!(backend.like_count(&target), 0);
}

// ============================================================================
// Subscription Lifecycle Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_watch_keeps_one_subscription() {
    let backend = backend();
    backend.set_read_delay(Some(Duration::from_millis(30)));
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let module = gallery();

    let (first, second) = tokio::join!(
        me.reconciler.watch_comments(module.clone()),
        me.reconciler.watch_comments(module.clone()),
    );
    let (first, second) = (first.unwrap(), second.unwrap());

    assert!(!first.is_live());
    assert!(second.is_live());
    assert_eq!(me.reconciler.registry().len(), 1);
    assert!(wait_until(|| backend.subscriber_count() == 1).await);

    backend.set_read_delay(None);
    backend.seed_comment(&UserId::new("u2"), &module, "once", None);
    let store = me.ctx().store();
    assert!(wait_until(|| store.thread_total(&module) == 1).await);
    settle().await;
    assert_eq!(store.thread_total(&module), 1);
}

#[tokio::test]
async fn test_unwatch_during_prime_discards_results() {
    let backend = backend();
    let module = gallery();
    backend.seed_comment(&UserId::new("u2"), &module, "late", None);
    backend.set_read_delay(Some(Duration::from_millis(50)));
    let me = Session::start(&backend, "me", "Ana").unwrap();
    let key = SubscriptionKey::new(ConsumerKind::CommentList, module.as_str());

    let (handle, removed) = tokio::join!(me.reconciler.watch_comments(module.clone()), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        me.reconciler.unwatch(&key)
    });

    assert!(removed);
    assert!(!handle.unwrap().is_live());
    assert!(!me.ctx().store().has_thread(&module));
    assert!(me.reconciler.registry().is_empty());
}

#[tokio::test]
async fn test_shutdown_releases_feed() {
    let backend = backend();
    let me = Session::start(&backend, "me", "Ana").unwrap();

    me.reconciler.watch_comments(gallery()).await.unwrap();
    me.reconciler.watch_likes().await.unwrap();
    me.reconciler.watch_notifications().await.unwrap();
    assert_eq!(backend.subscriber_count(), 3);

    me.reconciler.shutdown();
    assert!(me.reconciler.registry().is_empty());
    assert!(wait_until(|| backend.subscriber_count() == 0).await);

    // Events after shutdown touch nothing
    let id = CommentId::generate();
    backend.remove_comment_row(&id);
    backend.seed_comment(&UserId::new("u2"), &gallery(), "ignored", None);
    settle().await;
    assert_eq!(me.ctx().store().thread_total(&gallery()), 0);
}

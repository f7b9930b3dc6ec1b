//! Notification list and unread badge

use crew_core::{Notification, NotificationId};

/// Notifications held for the current member, newest-first
#[derive(Debug, Clone, Default)]
pub struct NotificationInbox {
    items: Vec<Notification>,
    unread: i64,
}

impl NotificationInbox {
    /// Replace the held page and badge with fetched values
    pub fn prime(&mut self, mut items: Vec<Notification>, unread: i64) {
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items.dedup_by(|a, b| a.id == b.id);
        self.items = items;
        self.unread = unread.max(0);
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread(&self) -> i64 {
        self.unread
    }

    pub fn contains(&self, id: &NotificationId) -> bool {
        self.items.iter().any(|n| n.id == *id)
    }

    /// Insert unless held; the badge moves only for a new unread row
    pub fn upsert(&mut self, notification: Notification) -> bool {
        if self.contains(&notification.id) {
            return false;
        }
        if !notification.is_read {
            self.unread += 1;
        }
        let pos = self
            .items
            .partition_point(|n| n.created_at >= notification.created_at);
        self.items.insert(pos, notification);
        true
    }

    /// Flip one held row to read; never decrements twice for the same id
    pub fn mark_read(&mut self, id: &NotificationId) -> bool {
        let Some(item) = self.items.iter_mut().find(|n| n.id == *id) else {
            return false;
        };
        if !item.mark_read() {
            return false;
        }
        self.unread = (self.unread - 1).max(0);
        true
    }

    /// Mark every held row read and clear the badge; returns rows flipped
    pub fn mark_all_read(&mut self) -> usize {
        let flipped = self
            .items
            .iter_mut()
            .map(Notification::mark_read)
            .filter(|flipped| *flipped)
            .count();
        self.unread = 0;
        flipped
    }

    pub fn set_unread(&mut self, count: i64) {
        self.unread = count.max(0);
    }

    pub fn increment_unread(&mut self) {
        self.unread += 1;
    }

    pub fn clear_unread(&mut self) {
        self.unread = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crew_core::{LikeTarget, NewNotification, UserId};

    fn notification(id: &str) -> Notification {
        let new = NewNotification::like(UserId::new("me"), UserId::new("u2"), &LikeTarget::photo("p1"))
            .unwrap();
        Notification::from_new(NotificationId::new(id), new)
    }

    #[test]
    fn test_upsert_counts_new_unread_once() {
        let mut inbox = NotificationInbox::default();
        assert!(inbox.upsert(notification("n1")));
        assert!(!inbox.upsert(notification("n1")));
        assert_eq!(inbox.unread(), 1);
        assert_eq!(inbox.items().len(), 1);
    }

    #[test]
    fn test_read_row_does_not_touch_badge() {
        let mut inbox = NotificationInbox::default();
        let mut n = notification("n1");
        n.is_read = true;
        inbox.upsert(n);
        assert_eq!(inbox.unread(), 0);
    }

    #[test]
    fn test_mark_read_is_monotonic() {
        let mut inbox = NotificationInbox::default();
        inbox.prime(vec![notification("n1"), notification("n2")], 2);

        assert!(inbox.mark_read(&NotificationId::new("n1")));
        assert!(!inbox.mark_read(&NotificationId::new("n1")));
        assert!(!inbox.mark_read(&NotificationId::new("unknown")));
        assert_eq!(inbox.unread(), 1);
    }

    #[test]
    fn test_mark_all_read() {
        let mut inbox = NotificationInbox::default();
        inbox.prime(vec![notification("n1"), notification("n2")], 7);
        assert_eq!(inbox.mark_all_read(), 2);
        assert_eq!(inbox.unread(), 0);
        assert!(inbox.items().iter().all(|n| n.is_read));
    }

    #[test]
    fn test_badge_never_negative() {
        let mut inbox = NotificationInbox::default();
        inbox.prime(vec![notification("n1")], 0);
        inbox.mark_read(&NotificationId::new("n1"));
        assert_eq!(inbox.unread(), 0);

        inbox.set_unread(-3);
        assert_eq!(inbox.unread(), 0);
        inbox.increment_unread();
        assert_eq!(inbox.unread(), 1);
        inbox.clear_unread();
        assert_eq!(inbox.unread(), 0);
    }
}

//! Sync layer settings

use crew_common::SocialConfig;
use crew_core::{COMMENT_MAX_CHARS, NOTIFICATION_PREVIEW_CHARS};

/// Limits applied by the services
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Longest accepted comment, in characters
    pub comment_max_chars: usize,
    /// Notifications loaded by `NotificationService::load`
    pub notification_page_size: i64,
    /// Characters of a comment quoted in its notification
    pub preview_chars: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            comment_max_chars: COMMENT_MAX_CHARS,
            notification_page_size: 50,
            preview_chars: NOTIFICATION_PREVIEW_CHARS,
        }
    }
}

impl From<&SocialConfig> for SyncConfig {
    fn from(config: &SocialConfig) -> Self {
        Self {
            comment_max_chars: config.comment_max_chars.min(COMMENT_MAX_CHARS),
            notification_page_size: config.notification_page_size,
            preview_chars: config.preview_chars,
        }
    }
}

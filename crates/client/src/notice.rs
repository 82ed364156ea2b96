//! Transient user-facing notices ("Added to cart", "Failed to remove item").
//!
//! Views publish notices here; whatever renders them (the CLI, a toast
//! layer) subscribes. A notice with no subscriber is only logged.

use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Notices buffered per subscriber before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 64;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A single transient notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    /// Unique ID, so a renderer can dismiss it.
    pub id: Uuid,
    /// Severity.
    pub level: NoticeLevel,
    /// User-facing text.
    pub message: String,
}

/// Publisher for notices. Cheap to clone.
#[derive(Clone)]
pub struct Notices {
    sender: broadcast::Sender<Notice>,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new()
    }
}

impl Notices {
    /// Create a publisher with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Subscribe to notices published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Publish a notice at `level`.
    pub fn publish(&self, level: NoticeLevel, message: impl Into<String>) -> Notice {
        let notice = Notice {
            id: Uuid::new_v4(),
            level,
            message: message.into(),
        };

        match level {
            NoticeLevel::Error => tracing::warn!(message = %notice.message, "Error notice"),
            NoticeLevel::Warning => tracing::info!(message = %notice.message, "Warning notice"),
            NoticeLevel::Success | NoticeLevel::Info => {
                tracing::debug!(message = %notice.message, "Notice");
            }
        }

        // No subscribers is fine: notices are fire-and-forget
        let _ = self.sender.send(notice.clone());
        notice
    }

    pub fn success(&self, message: impl Into<String>) -> Notice {
        self.publish(NoticeLevel::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) -> Notice {
        self.publish(NoticeLevel::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> Notice {
        self.publish(NoticeLevel::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> Notice {
        self.publish(NoticeLevel::Error, message)
    }
}

/// Drain every notice currently buffered for `receiver`.
#[must_use]
pub fn drain(receiver: &mut broadcast::Receiver<Notice>) -> Vec<Notice> {
    let mut notices = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(notice) => notices.push(notice),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Notice subscriber lagged");
            }
            Err(_) => break,
        }
    }
    notices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_reaches_subscribers() {
        let notices = Notices::new();
        let mut first = notices.subscribe();
        let mut second = notices.subscribe();

        notices.success("Added to cart");
        notices.error("Failed to remove item");

        let received = drain(&mut first);
        assert_eq!(received.len(), 2);
        assert_eq!(received[0].level, NoticeLevel::Success);
        assert_eq!(received[1].message, "Failed to remove item");
        assert_eq!(drain(&mut second).len(), 2);
    }

    #[test]
    fn test_publish_without_subscribers() {
        let notices = Notices::new();
        let notice = notices.warning("Your cart is empty");
        assert_eq!(notice.level, NoticeLevel::Warning);
    }

    #[test]
    fn test_late_subscriber_misses_earlier_notices() {
        let notices = Notices::new();
        notices.info("before");
        let mut late = notices.subscribe();
        assert!(drain(&mut late).is_empty());
    }
}

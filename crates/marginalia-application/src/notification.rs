//! User-facing notifications.
//!
//! Failures that the UI should surface as toasts or alerts are sent over an
//! unbounded channel; the receiving end belongs to the view layer.

use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Info,
    Warning,
    /// Blocking alert, used when a navigation was aborted.
    Alert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub timestamp: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    pub fn alert(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Alert, message)
    }
}

pub type NotificationSender = mpsc::UnboundedSender<Notification>;

/// Sends if a sender is configured. A closed receiver is ignored.
pub(crate) fn notify(sender: Option<&NotificationSender>, notification: Notification) {
    if let Some(sender) = sender {
        let _ = sender.send(notification);
    }
}

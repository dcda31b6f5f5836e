//! User-facing notifications and confirmation dialogs.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;

/// Notification severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Operation completed
    Success,
    /// Operation failed
    Error,
    /// Informational message
    Info,
}

impl NotificationLevel {
    /// Get the icon/prefix for this level
    pub fn prefix(&self) -> &'static str {
        match self {
            NotificationLevel::Success => "✔",
            NotificationLevel::Error => "✖",
            NotificationLevel::Info => "ℹ",
        }
    }
}

/// A notification shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    /// The message content, shown as-is
    pub message: String,
}

impl Notification {
    pub fn new(level: NotificationLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, title, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.level.prefix(), self.title, self.message)
    }
}

/// Pending notifications, oldest first.
#[derive(Debug, Clone, Default)]
pub struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub fn push(&mut self, notification: Notification) {
        tracing::debug!("Queued notification: {}", notification);
        self.queue.push_back(notification);
    }

    /// Take every pending notification.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Visual tone of a confirmation dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfirmTone {
    #[default]
    Normal,
    /// Destructive action (delete)
    Danger,
}

/// Modal dialogs the host UI provides.
#[async_trait]
pub trait Dialogs: Send + Sync {
    /// Ask the user to confirm an action. Resolves to `false` when declined
    /// or dismissed.
    async fn confirm(&self, message: &str, title: &str, tone: ConfirmTone) -> bool;
}

/// Dialogs that answer every confirmation the same way (scripts, `--yes`).
#[derive(Debug, Clone, Copy)]
pub struct FixedAnswer(pub bool);

#[async_trait]
impl Dialogs for FixedAnswer {
    async fn confirm(&self, message: &str, title: &str, _tone: ConfirmTone) -> bool {
        tracing::debug!("Auto-answering '{}' ({}) with {}", title, message, self.0);
        self.0
    }
}

//! Caller-supplied sinks for progress lines and user notifications.
//!
//! The pipeline never touches a terminal or a widget directly. It appends
//! lines to a [`LogSink`] and raises [`Notification`]s through a
//! [`Notifier`]; the front end decides how to render both.

use std::sync::{Mutex, PoisonError};

/// Append-only destination for human-readable progress lines.
///
/// Lines carry no trailing newline. The pipeline never reads back.
pub trait LogSink: Send + Sync {
    /// Appends one line.
    fn append(&self, line: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn append(&self, line: &str) {
        self(line);
    }
}

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Blocking error: the run could not do its job.
    Error,
    /// Informational: nothing to do, but nothing went wrong.
    Info,
    /// The run finished.
    Success,
}

impl NotificationLevel {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Info => "info",
            Self::Success => "success",
        }
    }
}

/// A short title plus a longer message, raised at a decision point of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity.
    pub level: NotificationLevel,
    /// Dialog-style title, e.g. "Done".
    pub title: String,
    /// Body text; may span several lines.
    pub message: String,
}

impl Notification {
    /// Creates an error notification.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates an informational notification.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Creates a success notification.
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Destination for user-facing notifications.
pub trait Notifier: Send + Sync {
    /// Surfaces one notification.
    fn notify(&self, notification: &Notification);
}

impl<F> Notifier for F
where
    F: Fn(&Notification) + Send + Sync,
{
    fn notify(&self, notification: &Notification) {
        self(notification);
    }
}

/// In-memory [`LogSink`], for headless embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
}

impl MemoryLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all lines appended so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines containing `needle`.
    #[must_use]
    pub fn lines_containing(&self, needle: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|line| line.contains(needle))
            .collect()
    }
}

impl LogSink for MemoryLog {
    fn append(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_string());
    }
}

/// In-memory [`Notifier`], for headless embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl MemoryNotifier {
    /// Creates an empty notifier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all notifications raised so far.
    #[must_use]
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) {
        self.notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
    }
}

//! Transient notifications.
//!
//! All success and error feedback is a toast: non-blocking, auto-dismissing
//! after its duration. Time is passed in by the caller as Unix milliseconds.

use serde::{Deserialize, Serialize};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    /// Neutral information
    Info,
    /// Operation succeeded
    Success,
    /// Something needs attention but nothing was lost
    Warning,
    /// Operation failed
    Error,
}

impl ToastLevel {
    /// Default title shown when the caller gives none.
    pub fn default_title(self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Success => "Success",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }
}

/// A single notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Queue-local identifier
    pub id: u64,
    /// Severity
    pub level: ToastLevel,
    /// Short heading
    pub title: String,
    /// Body text
    pub text: String,
    /// Creation time (Unix ms)
    pub created_at_ms: u64,
    /// Lifetime in ms
    pub duration_ms: u64,
}

impl Toast {
    /// Whether the toast has outlived its duration at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at_ms) >= self.duration_ms
    }
}

/// Ordered queue of live toasts, oldest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToastQueue {
    next_id: u64,
    toasts: Vec<Toast>,
}

impl ToastQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a toast and return its id.
    pub fn push(
        &mut self,
        level: ToastLevel,
        title: Option<&str>,
        text: impl Into<String>,
        now_ms: u64,
        duration_ms: u64,
    ) -> u64 {
        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            level,
            title: title.unwrap_or(level.default_title()).to_string(),
            text: text.into(),
            created_at_ms: now_ms,
            duration_ms,
        });
        self.next_id
    }

    /// Close a toast early.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    /// Drop every toast expired at `now_ms`; returns how many were removed.
    pub fn prune(&mut self, now_ms: u64) -> usize {
        let before = self.toasts.len();
        self.toasts.retain(|t| !t.is_expired(now_ms));
        before - self.toasts.len()
    }

    /// Toasts still visible at `now_ms`.
    pub fn visible(&self, now_ms: u64) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().filter(move |t| !t.is_expired(now_ms))
    }

    /// Most recent toast.
    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    /// Number of queued toasts, expired or not.
    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_by_time() {
        let mut queue = ToastQueue::new();
        queue.push(ToastLevel::Success, None, "Item reported", 1_000, 5_000);
        queue.push(ToastLevel::Error, Some("Oops"), "Try again", 3_000, 5_000);

        assert_eq!(queue.visible(5_999).count(), 2);
        assert_eq!(queue.visible(6_000).count(), 1);
        assert_eq!(queue.prune(6_000), 1);
        assert_eq!(queue.latest().map(|t| t.title.as_str()), Some("Oops"));
        assert_eq!(queue.prune(8_000), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut queue = ToastQueue::new();
        let id = queue.push(ToastLevel::Info, None, "hello", 0, 5_000);
        assert_eq!(queue.latest().map(|t| t.title.as_str()), Some("Info"));
        assert!(queue.dismiss(id));
        assert!(!queue.dismiss(id));
    }
}

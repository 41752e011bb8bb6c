//! Toast notifications for the TUI.
//!
//! Errors and action results surface as short-lived toasts in a corner
//! of the screen. Toasts auto-dismiss; overflow beyond the visible cap
//! is summarized with a counter.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::Error;

/// Maximum number of toasts to display at once
const MAX_VISIBLE_TOASTS: usize = 3;

/// Default auto-dismiss duration in seconds
const DEFAULT_DISMISS_SECONDS: u64 = 5;

/// Notification level (determines styling)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

impl NotificationLevel {
    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            NotificationLevel::Info => Color::Blue,
            NotificationLevel::Success => Color::Green,
            NotificationLevel::Error => Color::Red,
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✓",
            NotificationLevel::Error => "✗",
        }
    }
}

/// A single toast notification
#[derive(Debug, Clone)]
pub struct Toast {
    pub level: NotificationLevel,
    pub message: String,
    created_at: Instant,
    duration: Duration,
}

impl Toast {
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            created_at: Instant::now(),
            duration: Duration::from_secs(DEFAULT_DISMISS_SECONDS),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Active toasts, newest first.
#[derive(Debug, Default)]
pub struct Toasts {
    toasts: VecDeque<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Info, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(NotificationLevel::Error, message);
    }

    /// Toast for a failed admin call, built from whichever error fields
    /// are present.
    pub fn admin_error(&mut self, action: &str, error: &Error) {
        self.error(format!("{}: {}", action, error.summary()));
    }

    fn push(&mut self, level: NotificationLevel, message: impl Into<String>) {
        self.toasts.push_front(Toast::new(level, message));
    }

    /// Drop expired toasts.
    pub fn cleanup(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn visible(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter().take(MAX_VISIBLE_TOASTS)
    }

    /// Count of toasts beyond the visible cap.
    pub fn overflow(&self) -> usize {
        self.toasts.len().saturating_sub(MAX_VISIBLE_TOASTS)
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_capped_with_overflow() {
        let mut toasts = Toasts::new();
        for i in 0..5 {
            toasts.info(format!("message {}", i));
        }
        assert_eq!(toasts.visible().count(), MAX_VISIBLE_TOASTS);
        assert_eq!(toasts.overflow(), 2);
    }

    #[test]
    fn test_newest_toast_first() {
        let mut toasts = Toasts::new();
        toasts.info("first");
        toasts.error("second");
        assert_eq!(toasts.visible().next().unwrap().message, "second");
    }

    #[test]
    fn test_admin_error_includes_status() {
        let mut toasts = Toasts::new();
        let error = Error::Server {
            status: 503,
            status_text: "Service Unavailable".to_string(),
        };
        toasts.admin_error("refresh mappings", &error);
        let toast = toasts.visible().next().unwrap();
        assert_eq!(toast.level, NotificationLevel::Error);
        assert!(toast.message.contains("503"));
        assert!(toast.message.contains("refresh mappings"));
    }

    #[test]
    fn test_fresh_toast_not_expired() {
        let toast = Toast::new(NotificationLevel::Info, "hello");
        assert!(!toast.is_expired());
    }
}

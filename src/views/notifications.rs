//! Transient dashboard notifications
//!
//! Entries live in memory only, newest first. Each one removes itself after
//! the configured lifetime unless it was dismissed earlier.

use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Notification category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => f.write_str("info"),
            Severity::Success => f.write_str("success"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// One notification entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    /// Where it came from, e.g. `Settings` or `Navigation`
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Relative age such as `just now` or `5m ago`
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let secs = (now - self.created_at).num_seconds().max(0);
        match secs {
            0..=59 => "just now".to_string(),
            60..=3_599 => format!("{}m ago", secs / 60),
            _ => format!("{}h ago", secs / 3_600),
        }
    }
}

type Entries = Arc<Mutex<VecDeque<Notification>>>;

/// Most-recent-first list of self-expiring notifications
#[derive(Debug)]
pub struct NotificationCenter {
    entries: Entries,
    next_id: AtomicU64,
    ttl: Duration,
    cancel: CancellationToken,
}

impl NotificationCenter {
    /// Create an empty list whose expiry timers stop when `cancel` fires
    pub fn new(ttl: Duration, cancel: CancellationToken) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::new())),
            next_id: AtomicU64::new(1),
            ttl,
            cancel,
        }
    }

    /// Insert a notification at the head of the list and return its id
    ///
    /// Must be called from within a tokio runtime; the expiry timer is a task.
    pub fn push(
        &self,
        severity: Severity,
        message: impl Into<String>,
        source: impl Into<String>,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let notification = Notification {
            id,
            severity,
            message: message.into(),
            source: source.into(),
            created_at: Utc::now(),
        };
        tracing::debug!(id, %severity, message = %notification.message, "Notification added");
        lock(&self.entries).push_front(notification);

        let entries = Arc::clone(&self.entries);
        let cancel = self.cancel.clone();
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(ttl) => {
                    lock(&entries).retain(|n| n.id != id);
                }
            }
        });

        id
    }

    /// Remove one notification; returns whether it was still present
    pub fn dismiss(&self, id: u64) -> bool {
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    /// Remove everything; returns how many were removed
    pub fn clear(&self) -> usize {
        let mut entries = lock(&self.entries);
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Current entries, newest first
    pub fn list(&self) -> Vec<Notification> {
        lock(&self.entries).iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock(entries: &Entries) -> MutexGuard<'_, VecDeque<Notification>> {
    entries
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

//! Notifications
//!
//! Transient toast queue. Toasts auto-dismiss after [`TOAST_TTL`] of display
//! time; expiry is checked against injected [`Instant`]s rather than a real
//! timer, so the queue is fully deterministic under test.

use std::time::{Duration, Instant};

use smallvec::SmallVec;

/// How long a toast stays visible.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// Visual severity of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation landed.
    Success,

    /// Operation was rejected or failed.
    Error,

    /// Neutral information.
    Info,
}

/// One transient toast.
#[derive(Debug, Clone)]
pub struct Notification {
    severity: Severity,
    message: String,
    expires_at: Instant,
}

impl Notification {
    /// Severity of the toast.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Message shown to the user.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// FIFO queue of visible toasts.
#[derive(Debug)]
pub struct Notifications {
    toasts: SmallVec<[Notification; 4]>,
    ttl: Duration,
}

impl Notifications {
    /// Create an empty queue with the standard [`TOAST_TTL`].
    #[must_use]
    pub fn new() -> Self {
        Notifications::with_ttl(TOAST_TTL)
    }

    /// Create an empty queue with a custom time-to-live.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Notifications {
            toasts: SmallVec::new(),
            ttl,
        }
    }

    /// Show a toast from `now` until `now + ttl`.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>, now: Instant) {
        self.toasts.push(Notification {
            severity,
            message: message.into(),
            expires_at: now + self.ttl,
        });
    }

    /// Drop every toast whose display time has elapsed.
    pub fn sweep(&mut self, now: Instant) {
        self.toasts.retain(|toast| toast.expires_at > now);
    }

    /// Currently visible toasts, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter()
    }

    /// Most recent toast, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&Notification> {
        self.toasts.last()
    }

    /// Whether any toast is visible.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Notifications::new()
    }
}

//! Independently timed notifications.
//!
//! Each toast carries its own lifetime; [`Toasts::prune`] drops the expired
//! ones and nothing else ever removes a toast except an explicit dismiss.

use std::time::{Duration, Instant};

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);
/// Lifetime of the login toasts
pub const SHORT_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub shown_at: Instant,
    pub ttl: Duration,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }
}

#[derive(Debug, Default)]
pub struct Toasts {
    next_id: u64,
    items: Vec<Toast>,
}

impl Toasts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, ttl: Duration) -> u64 {
        self.push_at(kind, message, ttl, Instant::now())
    }

    pub fn push_at(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        ttl: Duration,
        now: Instant,
    ) -> u64 {
        self.next_id += 1;
        self.items.push(Toast {
            id: self.next_id,
            kind,
            message: message.into(),
            shown_at: now,
            ttl,
        });
        self.next_id
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Error, message, DEFAULT_TTL)
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message, DEFAULT_TTL)
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    /// Drops expired toasts, returning how many went away
    pub fn prune(&mut self, now: Instant) -> usize {
        let before = self.items.len();
        self.items.retain(|t| !t.is_expired(now));
        before - self.items.len()
    }

    /// Toasts still on screen at `now`, oldest first
    pub fn visible(&self, now: Instant) -> Vec<&Toast> {
        self.items.iter().filter(|t| !t.is_expired(now)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn last(&self) -> Option<&Toast> {
        self.items.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_expire_independently() {
        let start = Instant::now();
        let mut toasts = Toasts::new();
        let short = toasts.push_at(ToastKind::Error, "short", Duration::from_secs(3), start);
        toasts.push_at(
            ToastKind::Info,
            "long",
            Duration::from_secs(5),
            start + Duration::from_secs(1),
        );

        let at = |secs| start + Duration::from_secs(secs);
        assert_eq!(toasts.visible(at(2)).len(), 2);

        let visible: Vec<&str> = toasts.visible(at(4)).iter().map(|t| t.message.as_str()).collect();
        assert_eq!(visible, vec!["long"]);

        assert_eq!(toasts.prune(at(4)), 1);
        assert!(toasts.visible(at(4)).iter().all(|t| t.id != short));
        assert_eq!(toasts.prune(at(6)), 1);
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_dismiss() {
        let mut toasts = Toasts::new();
        let first = toasts.error("first");
        toasts.success("second");
        toasts.dismiss(first);

        assert_eq!(toasts.len(), 1);
        assert_eq!(toasts.last().map(|t| t.kind), Some(ToastKind::Success));
    }
}

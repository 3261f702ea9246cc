//! Per-key counting window.

/// Counting state for one notification key.
///
/// A window covers `[reset_time - window_ms, reset_time)`. Timestamps are
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateWindow {
    /// Notifications admitted in the current window
    pub count: u32,
    /// When the window expires (ms since epoch)
    pub reset_time: u64,
}

impl RateWindow {
    /// Start a window at `now_ms` with one admission already counted.
    pub fn starting_at(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: 1,
            reset_time: now_ms.saturating_add(window_ms),
        }
    }

    /// A window that exists in the store but has not admitted anything yet.
    ///
    /// Only ever observed inside a single check, before the policy registers
    /// the first admission.
    pub(crate) fn pending(now_ms: u64, window_ms: u64) -> Self {
        Self {
            count: 0,
            reset_time: now_ms.saturating_add(window_ms),
        }
    }

    /// Whether the window has expired at `now_ms`.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms >= self.reset_time
    }

    /// Milliseconds left until the window resets, zero once expired.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.reset_time.saturating_sub(now_ms)
    }
}

//! Fixed-window admission policy.
//!
//! Counts admissions per key inside a fixed window and refuses further
//! notifications once the ceiling is reached, until the window expires.
//! Bursts straddling a window boundary can admit up to twice the ceiling in
//! a short span; that is accepted behavior for best-effort throttling.

use crate::domain::window::RateWindow;
use std::time::Duration;

/// Default admission ceiling per window.
pub const DEFAULT_MAX_NOTIFICATIONS: u32 = 10;

/// Default window length (60 000 ms).
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);

/// Outcome of registering a notification against a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The notification may be sent
    Admitted,
    /// The window is full
    Throttled,
}

impl Admission {
    /// Check if this admission allows the notification.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }

    /// Check if this admission refuses the notification.
    pub fn is_throttled(&self) -> bool {
        matches!(self, Admission::Throttled)
    }
}

/// Error returned when policy validation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// Admission ceiling must be greater than zero
    ZeroMaxNotifications,
    /// Window must be at least one millisecond
    ZeroWindow,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PolicyError::ZeroMaxNotifications => {
                write!(f, "max_notifications must be greater than 0")
            }
            PolicyError::ZeroWindow => {
                write!(f, "window must be at least 1 millisecond")
            }
        }
    }
}

impl std::error::Error for PolicyError {}

/// Fixed-window counter policy.
///
/// # Example
/// ```
/// use notification_throttle::{FixedWindowPolicy, RateWindow};
/// use std::time::Duration;
///
/// let policy = FixedWindowPolicy::new(2, Duration::from_millis(1_000)).unwrap();
/// let mut window = RateWindow::starting_at(0, policy.window_ms());
///
/// // The window already holds one admission; one more fits
/// assert!(policy.register(&mut window, 10).is_admitted());
/// assert!(policy.register(&mut window, 20).is_throttled());
///
/// // Once the window has expired a fresh one starts
/// assert!(policy.register(&mut window, 1_001).is_admitted());
/// assert_eq!(window, RateWindow::starting_at(1_001, 1_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWindowPolicy {
    max_notifications: u32,
    window_ms: u64,
}

impl FixedWindowPolicy {
    /// Create a new fixed-window policy.
    ///
    /// # Arguments
    /// * `max_notifications` - Admissions allowed per window
    /// * `window` - Window length, truncated to whole milliseconds
    ///
    /// # Errors
    /// Returns `PolicyError::ZeroMaxNotifications` if `max_notifications` is 0,
    /// or `PolicyError::ZeroWindow` if `window` is shorter than 1 ms.
    pub fn new(max_notifications: u32, window: Duration) -> Result<Self, PolicyError> {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        Self::from_millis(max_notifications, window_ms)
    }

    /// Create a new fixed-window policy from a window length in milliseconds.
    ///
    /// # Errors
    /// Same as [`FixedWindowPolicy::new`].
    pub fn from_millis(max_notifications: u32, window_ms: u64) -> Result<Self, PolicyError> {
        if max_notifications == 0 {
            return Err(PolicyError::ZeroMaxNotifications);
        }
        if window_ms == 0 {
            return Err(PolicyError::ZeroWindow);
        }
        Ok(Self {
            max_notifications,
            window_ms,
        })
    }

    /// Admission ceiling per window.
    pub fn max_notifications(&self) -> u32 {
        self.max_notifications
    }

    /// Window length in milliseconds.
    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    /// Window length.
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Register one notification against `window` at `now_ms`.
    ///
    /// An expired window is replaced by a fresh one holding this admission.
    /// An active window is incremented while below the ceiling. A full
    /// window is left untouched.
    pub fn register(&self, window: &mut RateWindow, now_ms: u64) -> Admission {
        if window.is_expired(now_ms) {
            *window = RateWindow::starting_at(now_ms, self.window_ms);
            return Admission::Admitted;
        }

        if window.count < self.max_notifications {
            window.count += 1;
            Admission::Admitted
        } else {
            Admission::Throttled
        }
    }
}

impl Default for FixedWindowPolicy {
    fn default() -> Self {
        Self {
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            window_ms: DEFAULT_WINDOW.as_millis() as u64,
        }
    }
}

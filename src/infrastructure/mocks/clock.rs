//! Mock clock for testing.

use crate::application::ports::Clock;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock clock for testing.
///
/// Allows tests to control time progression explicitly, enabling deterministic
/// testing of window expiry and cleanup.
///
/// # Examples
///
/// ```
/// use notification_throttle::infrastructure::mocks::MockClock;
/// use notification_throttle::application::ports::Clock;
/// use std::time::Duration;
///
/// let clock = MockClock::new(0);
/// assert_eq!(clock.now_millis(), 0);
///
/// clock.advance(Duration::from_secs(1));
/// assert_eq!(clock.now_millis(), 1_000);
///
/// clock.set_millis(1_001);
/// assert_eq!(clock.now_millis(), 1_001);
/// ```
///
/// # Thread Safety
///
/// `MockClock` can be cloned to share across threads. All clones share the
/// same underlying time value, so advancing time in one clone affects all
/// clones.
#[derive(Debug, Clone)]
pub struct MockClock {
    current_millis: Arc<Mutex<u64>>,
}

impl MockClock {
    /// Create a mock clock starting at `start_millis` since the epoch.
    pub fn new(start_millis: u64) -> Self {
        Self {
            current_millis: Arc::new(Mutex::new(start_millis)),
        }
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.advance_millis(millis);
    }

    /// Advance the clock by a number of milliseconds.
    pub fn advance_millis(&self, millis: u64) {
        let mut time = self
            .current_millis
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = time.saturating_add(millis);
    }

    /// Set the clock to a specific time.
    pub fn set_millis(&self, millis: u64) {
        let mut time = self
            .current_millis
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock");
        *time = millis;
    }
}

impl Clock for MockClock {
    fn now_millis(&self) -> u64 {
        *self
            .current_millis
            .lock()
            .expect("MockClock mutex poisoned - a test thread panicked while holding the lock")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_clock() {
        let clock = MockClock::new(100);

        assert_eq!(clock.now_millis(), 100);

        clock.advance(Duration::from_secs(10));
        assert_eq!(clock.now_millis(), 10_100);

        clock.set_millis(5);
        assert_eq!(clock.now_millis(), 5);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = MockClock::new(0);
        let clone = clock.clone();

        std::thread::spawn(move || clone.advance_millis(42))
            .join()
            .unwrap();

        assert_eq!(clock.now_millis(), 42);
    }
}

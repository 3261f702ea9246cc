//! Notification throttle facade.
//!
//! Wires a clock, sharded window storage, the rate limiter and the cleanup
//! sweeper into one value that services construct at startup.

use crate::application::{
    limiter::NotificationRateLimiter,
    metrics::Metrics,
    ports::{Clock, Storage},
    registry::WindowRegistry,
    sweeper::{SweeperConfig, SweeperConfigError, DEFAULT_CLEANUP_INTERVAL},
};
use crate::config::ThrottleConfig;
use crate::domain::{
    key::NotificationKey,
    policy::{FixedWindowPolicy, PolicyError, DEFAULT_MAX_NOTIFICATIONS, DEFAULT_WINDOW},
    window::RateWindow,
};
use crate::infrastructure::clock::SystemClock;
use crate::infrastructure::storage::ShardedStorage;

use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "async")]
use crate::application::sweeper::{CleanupSweeper, ShutdownError, SweeperHandle};

#[cfg(feature = "async")]
use std::sync::{Mutex, PoisonError};

/// Error returned when building a NotificationThrottle fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Admission policy validation failed
    Policy(PolicyError),
    /// Sweeper configuration validation failed
    Sweeper(SweeperConfigError),
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Policy(e) => write!(f, "policy configuration error: {}", e),
            BuildError::Sweeper(e) => write!(f, "sweeper configuration error: {}", e),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Policy(e) => Some(e),
            BuildError::Sweeper(e) => Some(e),
        }
    }
}

impl From<PolicyError> for BuildError {
    fn from(e: PolicyError) -> Self {
        BuildError::Policy(e)
    }
}

impl From<SweeperConfigError> for BuildError {
    fn from(e: SweeperConfigError) -> Self {
        BuildError::Sweeper(e)
    }
}

/// Builder for constructing a `NotificationThrottle`.
///
/// Values are validated in [`build`](NotificationThrottleBuilder::build).
pub struct NotificationThrottleBuilder {
    max_notifications: u32,
    window: Duration,
    cleanup_interval: Duration,
    clock: Option<Arc<dyn Clock>>,
}

impl NotificationThrottleBuilder {
    /// Use an already validated policy.
    pub fn with_policy(mut self, policy: FixedWindowPolicy) -> Self {
        self.max_notifications = policy.max_notifications();
        self.window = policy.window();
        self
    }

    /// Set how many notifications a user may receive per window.
    pub fn with_max_notifications(mut self, max_notifications: u32) -> Self {
        self.max_notifications = max_notifications;
        self
    }

    /// Set the window length.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    /// Set how often expired windows are swept.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }

    /// Read time from a custom clock instead of the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Apply every setting from a [`ThrottleConfig`].
    pub fn with_config(mut self, config: &ThrottleConfig) -> Self {
        self.max_notifications = config.max_notifications;
        self.window = Duration::from_millis(config.window_ms);
        self.cleanup_interval = Duration::from_millis(config.cleanup_interval_ms);
        self
    }

    /// Build the throttle.
    ///
    /// # Errors
    /// Returns `BuildError::Policy` for a zero ceiling or a window under 1 ms,
    /// and `BuildError::Sweeper` for a zero cleanup interval.
    pub fn build(self) -> Result<NotificationThrottle, BuildError> {
        let policy = FixedWindowPolicy::new(self.max_notifications, self.window)?;
        let sweeper_config = SweeperConfig::new(self.cleanup_interval)?;
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock::new()) as Arc<dyn Clock>);

        Ok(NotificationThrottle::from_parts(policy, sweeper_config, clock))
    }
}

/// Process-local notification throttle.
///
/// Construct one at service startup, call
/// [`check_notification_rate_limit`](NotificationThrottle::check_notification_rate_limit)
/// before sending each notification, and start the cleanup task with
/// [`start_cleanup`](NotificationThrottle::start_cleanup). Clones share state.
///
/// # Example
/// ```
/// use notification_throttle::NotificationThrottle;
/// use std::time::Duration;
///
/// let throttle = NotificationThrottle::builder()
///     .with_max_notifications(2)
///     .with_window(Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// assert!(throttle.check_notification_rate_limit("u1"));
/// assert!(throttle.check_notification_rate_limit("u1"));
/// assert!(!throttle.check_notification_rate_limit("u1"));
///
/// // Other users are unaffected
/// assert!(throttle.check_notification_rate_limit("u2"));
/// ```
#[derive(Clone)]
pub struct NotificationThrottle<S = Arc<ShardedStorage<NotificationKey, RateWindow>>>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    limiter: NotificationRateLimiter<S>,
    sweeper_config: SweeperConfig,
    #[cfg(feature = "async")]
    sweeper_handle: Arc<Mutex<Option<SweeperHandle>>>,
}

impl<S> NotificationThrottle<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    /// Check whether a notification for `user_id` may be sent now.
    ///
    /// Uses the configured policy. Returns `false` when the user's current
    /// window is full; a warning naming the user is logged in that case.
    pub fn check_notification_rate_limit(&self, user_id: &str) -> bool {
        self.limiter.check(user_id).is_admitted()
    }

    /// Check a notification for `user_id` with a per-call ceiling and window.
    ///
    /// # Example
    /// ```
    /// use notification_throttle::{FixedWindowPolicy, NotificationThrottle};
    ///
    /// let throttle = NotificationThrottle::new();
    /// let strict = FixedWindowPolicy::from_millis(1, 1_000).unwrap();
    ///
    /// assert!(throttle.check_notification_rate_limit_with("u1", &strict));
    /// assert!(!throttle.check_notification_rate_limit_with("u1", &strict));
    /// ```
    pub fn check_notification_rate_limit_with(
        &self,
        user_id: &str,
        policy: &FixedWindowPolicy,
    ) -> bool {
        self.limiter.check_with(user_id, policy).is_admitted()
    }

    /// Remove every window that has expired.
    ///
    /// Returns the number of windows removed. Expired windows are already
    /// treated as fresh by the check, so this only bounds memory.
    pub fn cleanup_rate_limit(&self) -> usize {
        self.limiter.cleanup()
    }

    /// Get a copy of the window currently stored for `user_id`.
    pub fn window(&self, user_id: &str) -> Option<RateWindow> {
        self.limiter.window(user_id)
    }

    /// Get the number of windows currently stored.
    pub fn tracked_windows(&self) -> usize {
        self.limiter.registry().len()
    }

    /// Get the configured policy.
    pub fn policy(&self) -> &FixedWindowPolicy {
        self.limiter.registry().default_policy()
    }

    /// Get the cleanup sweeper configuration.
    pub fn sweeper_config(&self) -> &SweeperConfig {
        &self.sweeper_config
    }

    /// Get a reference to the underlying limiter.
    pub fn limiter(&self) -> &NotificationRateLimiter<S> {
        &self.limiter
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        self.limiter.metrics()
    }
}

#[cfg(feature = "async")]
impl<S> NotificationThrottle<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone + Send + 'static,
{
    /// Start the periodic cleanup task.
    ///
    /// Returns `false` without spawning anything if the task is already
    /// running. A task that has finished on its own (it panicked) is
    /// replaced. Must be called from within a tokio runtime.
    pub fn start_cleanup(&self) -> bool {
        let mut guard = self
            .sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if guard.as_ref().is_some_and(|handle| !handle.is_finished()) {
            tracing::debug!("notification cleanup already running");
            return false;
        }

        let sweeper = CleanupSweeper::new(self.limiter.clone(), self.sweeper_config);
        *guard = Some(sweeper.start());
        true
    }

    /// Check whether the cleanup task has been started and not shut down.
    pub fn is_cleanup_running(&self) -> bool {
        self.sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the cleanup task, if running, and wait for it to finish.
    ///
    /// # Errors
    /// Returns an error if the task fails to shut down cleanly.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        // Release the lock before awaiting
        let handle = self
            .sweeper_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(handle) = handle {
            handle.shutdown().await?;
        }
        Ok(())
    }
}

impl NotificationThrottle<Arc<ShardedStorage<NotificationKey, RateWindow>>> {
    /// Create a builder for configuring the throttle.
    ///
    /// Defaults:
    /// - Max notifications: 10 per window
    /// - Window: 60 seconds
    /// - Cleanup interval: 5 minutes
    /// - Clock: system clock
    pub fn builder() -> NotificationThrottleBuilder {
        NotificationThrottleBuilder {
            max_notifications: DEFAULT_MAX_NOTIFICATIONS,
            window: DEFAULT_WINDOW,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
            clock: None,
        }
    }

    /// Create a throttle with default settings.
    pub fn new() -> Self {
        Self::from_parts(
            FixedWindowPolicy::default(),
            SweeperConfig::default(),
            Arc::new(SystemClock::new()),
        )
    }

    fn from_parts(
        policy: FixedWindowPolicy,
        sweeper_config: SweeperConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let storage = Arc::new(ShardedStorage::new());
        let registry = WindowRegistry::new(storage, clock, policy);

        Self {
            limiter: NotificationRateLimiter::new(registry, Metrics::new()),
            sweeper_config,
            #[cfg(feature = "async")]
            sweeper_handle: Arc::new(Mutex::new(None)),
        }
    }
}

impl Default for NotificationThrottle<Arc<ShardedStorage<NotificationKey, RateWindow>>> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::mocks::MockClock;

    fn throttle_at(clock: &Arc<MockClock>, max: u32, window_ms: u64) -> NotificationThrottle {
        NotificationThrottle::builder()
            .with_max_notifications(max)
            .with_window(Duration::from_millis(window_ms))
            .with_clock(clock.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let throttle = NotificationThrottle::new();
        assert_eq!(throttle.policy().max_notifications(), 10);
        assert_eq!(throttle.policy().window_ms(), 60_000);
        assert_eq!(throttle.sweeper_config().interval, Duration::from_secs(300));
        assert_eq!(throttle.tracked_windows(), 0);
    }

    #[test]
    fn test_builder_rejects_zero_max() {
        let result = NotificationThrottle::builder()
            .with_max_notifications(0)
            .build();
        assert!(matches!(
            result,
            Err(BuildError::Policy(PolicyError::ZeroMaxNotifications))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_window() {
        let result = NotificationThrottle::builder()
            .with_window(Duration::ZERO)
            .build();
        assert!(matches!(
            result,
            Err(BuildError::Policy(PolicyError::ZeroWindow))
        ));
    }

    #[test]
    fn test_builder_rejects_zero_cleanup_interval() {
        let result = NotificationThrottle::builder()
            .with_cleanup_interval(Duration::ZERO)
            .build();
        assert!(matches!(
            result,
            Err(BuildError::Sweeper(SweeperConfigError::ZeroInterval))
        ));
    }

    #[test]
    fn test_builder_with_config() {
        let config = ThrottleConfig {
            max_notifications: 3,
            window_ms: 1_500,
            cleanup_interval_ms: 10_000,
        };
        let throttle = NotificationThrottle::builder()
            .with_config(&config)
            .build()
            .unwrap();

        assert_eq!(throttle.policy().max_notifications(), 3);
        assert_eq!(throttle.policy().window_ms(), 1_500);
        assert_eq!(
            throttle.sweeper_config().interval,
            Duration::from_millis(10_000)
        );
    }

    #[test]
    fn test_builder_with_policy() {
        let policy = FixedWindowPolicy::from_millis(7, 2_000).unwrap();
        let throttle = NotificationThrottle::builder()
            .with_policy(policy)
            .build()
            .unwrap();
        assert_eq!(throttle.policy(), &policy);
    }

    #[test]
    fn test_check_and_cleanup() {
        let clock = Arc::new(MockClock::new(0));
        let throttle = throttle_at(&clock, 2, 1_000);

        assert!(throttle.check_notification_rate_limit("u1"));
        assert!(throttle.check_notification_rate_limit("u1"));
        assert!(!throttle.check_notification_rate_limit("u1"));

        clock.set_millis(1_000);
        assert_eq!(throttle.cleanup_rate_limit(), 1);
        assert_eq!(throttle.tracked_windows(), 0);
        assert!(throttle.check_notification_rate_limit("u1"));
    }

    #[test]
    fn test_clones_share_state() {
        let clock = Arc::new(MockClock::new(0));
        let throttle = throttle_at(&clock, 1, 1_000);
        let clone = throttle.clone();

        assert!(throttle.check_notification_rate_limit("u1"));
        assert!(!clone.check_notification_rate_limit("u1"));
        assert_eq!(clone.metrics().notifications_throttled(), 1);
    }

    #[test]
    fn test_build_error_display() {
        let err = BuildError::from(PolicyError::ZeroWindow);
        assert_eq!(
            err.to_string(),
            "policy configuration error: window must be at least 1 millisecond"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_start_cleanup_is_idempotent() {
        let clock = Arc::new(MockClock::new(0));
        let throttle = throttle_at(&clock, 1, 1_000);

        assert!(!throttle.is_cleanup_running());
        assert!(throttle.start_cleanup());
        assert!(!throttle.start_cleanup());
        assert!(throttle.is_cleanup_running());

        throttle.shutdown().await.unwrap();
        assert!(!throttle.is_cleanup_running());

        // Shutting down twice is a no-op
        throttle.shutdown().await.unwrap();
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_background_cleanup_evicts_expired() {
        let clock = Arc::new(MockClock::new(0));
        let throttle = NotificationThrottle::builder()
            .with_max_notifications(1)
            .with_window(Duration::from_secs(1))
            .with_cleanup_interval(Duration::from_secs(300))
            .with_clock(clock.clone())
            .build()
            .unwrap();

        throttle.check_notification_rate_limit("u1");
        throttle.check_notification_rate_limit("u2");
        assert!(throttle.start_cleanup());

        clock.set_millis(2_000);
        tokio::time::sleep(Duration::from_secs(301)).await;

        assert_eq!(throttle.tracked_windows(), 0);
        assert_eq!(throttle.metrics().windows_evicted(), 2);

        throttle.shutdown().await.unwrap();
    }

    /// Clock that panics once armed, to take down the sweeper task.
    #[cfg(feature = "async")]
    #[derive(Debug, Default)]
    struct FailingClock {
        armed: std::sync::atomic::AtomicBool,
    }

    #[cfg(feature = "async")]
    impl Clock for FailingClock {
        fn now_millis(&self) -> u64 {
            if self.armed.load(std::sync::atomic::Ordering::SeqCst) {
                panic!("clock unavailable");
            }
            0
        }
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_start_cleanup_replaces_finished_task() {
        use std::sync::atomic::Ordering;

        let clock = Arc::new(FailingClock::default());
        let throttle = NotificationThrottle::builder()
            .with_cleanup_interval(Duration::from_secs(1))
            .with_clock(clock.clone())
            .build()
            .unwrap();

        assert!(throttle.start_cleanup());
        clock.armed.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(1_500)).await;
        while throttle.is_cleanup_running() {
            tokio::task::yield_now().await;
        }
        clock.armed.store(false, Ordering::SeqCst);

        assert!(throttle.start_cleanup());
        assert!(throttle.is_cleanup_running());

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(throttle.metrics().sweeps(), 1);

        throttle.shutdown().await.unwrap();
    }
}

//! Periodic cleanup of expired notification windows.
//!
//! The sweeper is an explicitly started background task. Starting it returns
//! a [`SweeperHandle`]; the task runs until `shutdown()` is called on that
//! handle.

use crate::application::{limiter::NotificationRateLimiter, ports::Storage};
use crate::domain::{key::NotificationKey, window::RateWindow};
use std::time::Duration;

#[cfg(feature = "async")]
use tokio::{sync::oneshot, task::JoinHandle, time::interval_at};

/// Default time between cleanup sweeps (5 minutes).
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// How long `shutdown()` waits for the task to finish.
#[cfg(feature = "async")]
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Error returned when sweeper configuration validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweeperConfigError {
    /// Cleanup interval must be greater than zero
    ZeroInterval,
}

impl std::fmt::Display for SweeperConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweeperConfigError::ZeroInterval => {
                write!(f, "cleanup interval must be greater than 0")
            }
        }
    }
}

impl std::error::Error for SweeperConfigError {}

/// Configuration for the cleanup sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperConfig {
    /// How often to sweep expired windows
    pub interval: Duration,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl SweeperConfig {
    /// Create a new sweeper config with the specified interval.
    ///
    /// # Errors
    /// Returns `SweeperConfigError::ZeroInterval` if `interval` is zero.
    pub fn new(interval: Duration) -> Result<Self, SweeperConfigError> {
        if interval.is_zero() {
            return Err(SweeperConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

/// Error returned when a sweeper fails to shut down cleanly.
#[cfg(feature = "async")]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownError {
    /// The sweep task panicked
    TaskPanicked,
    /// The sweep task was cancelled by the runtime
    TaskCancelled,
    /// The sweep task did not stop within the shutdown timeout
    Timeout,
}

#[cfg(feature = "async")]
impl std::fmt::Display for ShutdownError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShutdownError::TaskPanicked => write!(f, "cleanup task panicked"),
            ShutdownError::TaskCancelled => write!(f, "cleanup task was cancelled"),
            ShutdownError::Timeout => {
                write!(f, "cleanup task did not stop within {:?}", SHUTDOWN_TIMEOUT)
            }
        }
    }
}

#[cfg(feature = "async")]
impl std::error::Error for ShutdownError {}

/// Handle to a running cleanup task.
///
/// Dropping the handle does not stop the task; it then keeps sweeping for as
/// long as the runtime lives. Call [`SweeperHandle::shutdown`] to stop it.
#[cfg(feature = "async")]
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    join_handle: JoinHandle<()>,
}

#[cfg(feature = "async")]
impl SweeperHandle {
    /// Stop the cleanup task and wait for it to finish.
    ///
    /// # Errors
    /// Returns an error if the task panicked, was cancelled, or did not stop
    /// within the shutdown timeout.
    pub async fn shutdown(mut self) -> Result<(), ShutdownError> {
        if let Some(tx) = self.shutdown_tx.take() {
            // The task may already be gone; the join below reports why.
            let _ = tx.send(());
        }

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.join_handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) if e.is_panic() => Err(ShutdownError::TaskPanicked),
            Ok(Err(_)) => Err(ShutdownError::TaskCancelled),
            Err(_) => Err(ShutdownError::Timeout),
        }
    }

    /// Check whether the task has finished.
    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }
}

/// Runs `cleanup` on a limiter at a fixed interval.
pub struct CleanupSweeper<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    limiter: NotificationRateLimiter<S>,
    config: SweeperConfig,
}

impl<S> CleanupSweeper<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    /// Create a new sweeper.
    pub fn new(limiter: NotificationRateLimiter<S>, config: SweeperConfig) -> Self {
        Self { limiter, config }
    }

    /// Run one sweep now.
    pub fn sweep(&self) -> usize {
        self.limiter.cleanup()
    }

    /// Start sweeping in a background task.
    ///
    /// The first sweep runs one full interval after start. Must be called
    /// from within a tokio runtime.
    #[cfg(feature = "async")]
    pub fn start(self) -> SweeperHandle
    where
        S: Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let period = self.config.interval;

        let join_handle = tokio::spawn(async move {
            let mut ticker = interval_at(tokio::time::Instant::now() + period, period);
            tracing::info!(interval = ?period, "notification cleanup started");

            let mut detached = false;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep();
                    }
                    result = &mut shutdown_rx, if !detached => {
                        match result {
                            Ok(()) => break,
                            // Handle dropped without shutdown: keep sweeping
                            Err(_) => detached = true,
                        }
                    }
                }
            }

            tracing::info!("notification cleanup stopped");
        });

        SweeperHandle {
            shutdown_tx: Some(shutdown_tx),
            join_handle,
        }
    }

    /// Get the sweeper configuration.
    pub fn config(&self) -> &SweeperConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{metrics::Metrics, registry::WindowRegistry};
    use crate::domain::policy::FixedWindowPolicy;
    use crate::infrastructure::mocks::MockClock;
    use crate::infrastructure::storage::ShardedStorage;
    use std::sync::Arc;

    fn limiter_with_clock(
        clock: Arc<MockClock>,
    ) -> NotificationRateLimiter<Arc<ShardedStorage<NotificationKey, RateWindow>>> {
        let storage = Arc::new(ShardedStorage::new());
        let policy = FixedWindowPolicy::from_millis(10, 1_000).unwrap();
        let registry = WindowRegistry::new(storage, clock, policy);
        NotificationRateLimiter::new(registry, Metrics::new())
    }

    #[test]
    fn test_config_zero_interval() {
        assert_eq!(
            SweeperConfig::new(Duration::ZERO),
            Err(SweeperConfigError::ZeroInterval)
        );
    }

    #[test]
    fn test_config_default_is_five_minutes() {
        assert_eq!(SweeperConfig::default().interval, Duration::from_secs(300));
    }

    #[test]
    fn test_manual_sweep() {
        let clock = Arc::new(MockClock::new(0));
        let limiter = limiter_with_clock(clock.clone());
        limiter.check("a");
        limiter.check("b");

        let sweeper = CleanupSweeper::new(limiter.clone(), SweeperConfig::default());
        assert_eq!(sweeper.sweep(), 0);

        clock.set_millis(1_000);
        assert_eq!(sweeper.sweep(), 2);
        assert!(limiter.registry().is_empty());
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_sweeps_on_interval() {
        let clock = Arc::new(MockClock::new(0));
        let limiter = limiter_with_clock(clock.clone());
        limiter.check("a");
        clock.set_millis(5_000);

        let config = SweeperConfig::new(Duration::from_secs(60)).unwrap();
        let handle = CleanupSweeper::new(limiter.clone(), config).start();

        // Nothing runs before the first interval has elapsed
        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(limiter.metrics().sweeps(), 0);
        assert_eq!(limiter.registry().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(limiter.metrics().sweeps(), 1);
        assert!(limiter.registry().is_empty());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(limiter.metrics().sweeps(), 3);

        handle.shutdown().await.unwrap();
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_no_sweeps_after_shutdown() {
        let clock = Arc::new(MockClock::new(0));
        let limiter = limiter_with_clock(clock);

        let config = SweeperConfig::new(Duration::from_secs(1)).unwrap();
        let handle = CleanupSweeper::new(limiter.clone(), config).start();

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(limiter.metrics().sweeps(), 1);

        handle.shutdown().await.unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(limiter.metrics().sweeps(), 1);
    }

    #[cfg(feature = "async")]
    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_keeps_sweeping() {
        let clock = Arc::new(MockClock::new(0));
        let limiter = limiter_with_clock(clock);

        let config = SweeperConfig::new(Duration::from_secs(1)).unwrap();
        drop(CleanupSweeper::new(limiter.clone(), config).start());

        tokio::time::sleep(Duration::from_millis(3_500)).await;
        assert_eq!(limiter.metrics().sweeps(), 3);
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_handle_reports_finished_after_shutdown() {
        let limiter = limiter_with_clock(Arc::new(MockClock::new(0)));
        let handle = CleanupSweeper::new(limiter, SweeperConfig::default()).start();

        assert!(!handle.is_finished());
        assert_eq!(handle.shutdown().await, Ok(()));
    }
}

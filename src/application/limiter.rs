//! Notification rate limiter.
//!
//! Decides whether a notification for a user may be sent, using a fixed
//! window per user, and sweeps windows that have expired.

use crate::application::metrics::Metrics;
use crate::application::ports::Storage;
use crate::application::registry::WindowRegistry;
use crate::domain::{
    key::NotificationKey,
    policy::{Admission, FixedWindowPolicy},
    window::RateWindow,
};
use tracing::{debug, trace, warn};

/// Coordinates admission decisions and cleanup over a window registry.
#[derive(Clone)]
pub struct NotificationRateLimiter<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    registry: WindowRegistry<S>,
    metrics: Metrics,
}

impl<S> NotificationRateLimiter<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    /// Create a new rate limiter.
    ///
    /// # Arguments
    /// * `registry` - The window registry (which contains the clock)
    /// * `metrics` - Metrics tracker
    pub fn new(registry: WindowRegistry<S>, metrics: Metrics) -> Self {
        Self { registry, metrics }
    }

    /// Check a notification for `user_id` against the registry's default policy.
    pub fn check(&self, user_id: &str) -> Admission {
        let policy = *self.registry.default_policy();
        self.check_with(user_id, &policy)
    }

    /// Check a notification for `user_id` against an explicit policy.
    ///
    /// Admits and counts the notification when the user's window is missing,
    /// expired, or below `policy.max_notifications()`. Otherwise the window
    /// is left untouched and a warning naming the user is logged.
    ///
    /// The window lookup, expiry check and increment happen under the
    /// storage's per-key lock.
    pub fn check_with(&self, user_id: &str, policy: &FixedWindowPolicy) -> Admission {
        let key = NotificationKey::for_user(user_id);
        let (admission, window, now) = self.registry.with_window(key, policy, |window, now| {
            let admission = policy.register(window, now);
            (admission, *window, now)
        });

        match admission {
            Admission::Admitted => {
                self.metrics.record_admitted();
                if window.count == 1 {
                    trace!(
                        user_id,
                        reset_time = window.reset_time,
                        "opened notification window"
                    );
                }
            }
            Admission::Throttled => {
                self.metrics.record_throttled();
                warn!(
                    user_id,
                    count = window.count,
                    max_notifications = policy.max_notifications(),
                    reset_time = window.reset_time,
                    retry_after_ms = window.remaining_ms(now),
                    "notification rate limit exceeded"
                );
            }
        }

        admission
    }

    /// Remove every expired window.
    ///
    /// Returns the number of windows evicted.
    pub fn cleanup(&self) -> usize {
        let evicted = self.registry.remove_expired();
        self.metrics.record_sweep(evicted);
        debug!(
            evicted,
            remaining = self.registry.len(),
            "swept expired notification windows"
        );
        evicted
    }

    /// Get a copy of the window currently stored for `user_id`.
    pub fn window(&self, user_id: &str) -> Option<RateWindow> {
        self.registry.window(&NotificationKey::for_user(user_id))
    }

    /// Get a reference to the registry.
    pub fn registry(&self) -> &WindowRegistry<S> {
        &self.registry
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

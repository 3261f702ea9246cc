//! Serializable throttle settings.
//!
//! Lets a service keep its notification limits in a config file and hand
//! them to [`NotificationThrottleBuilder::with_config`](crate::NotificationThrottleBuilder::with_config).
//! Every field is optional and falls back to the default.

use crate::application::sweeper::{SweeperConfig, SweeperConfigError, DEFAULT_CLEANUP_INTERVAL};
use crate::domain::policy::{
    FixedWindowPolicy, PolicyError, DEFAULT_MAX_NOTIFICATIONS, DEFAULT_WINDOW,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Notification throttle settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Notifications admitted per user per window (default: 10)
    #[serde(default = "default_max_notifications")]
    pub max_notifications: u32,

    /// Window length in milliseconds (default: 60000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Time between cleanup sweeps in milliseconds (default: 300000)
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,
}

fn default_max_notifications() -> u32 {
    DEFAULT_MAX_NOTIFICATIONS
}

fn default_window_ms() -> u64 {
    DEFAULT_WINDOW.as_millis() as u64
}

fn default_cleanup_interval_ms() -> u64 {
    DEFAULT_CLEANUP_INTERVAL.as_millis() as u64
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_notifications: default_max_notifications(),
            window_ms: default_window_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
        }
    }
}

impl ThrottleConfig {
    /// Build the admission policy these settings describe.
    ///
    /// # Errors
    /// Returns a `PolicyError` if `max_notifications` or `window_ms` is 0.
    pub fn policy(&self) -> Result<FixedWindowPolicy, PolicyError> {
        FixedWindowPolicy::from_millis(self.max_notifications, self.window_ms)
    }

    /// Build the sweeper configuration these settings describe.
    ///
    /// # Errors
    /// Returns `SweeperConfigError::ZeroInterval` if `cleanup_interval_ms` is 0.
    pub fn sweeper(&self) -> Result<SweeperConfig, SweeperConfigError> {
        SweeperConfig::new(Duration::from_millis(self.cleanup_interval_ms))
    }
}

//! Central registry of notification windows.
//!
//! The registry owns the window store and the clock, and hands out
//! exclusive access to one key's window at a time.

use crate::application::ports::{Clock, Storage};
use crate::domain::{key::NotificationKey, policy::FixedWindowPolicy, window::RateWindow};
use std::sync::Arc;

/// Registry managing all notification windows.
///
/// Uses the Storage port for concurrent access.
///
/// This type is generic over the storage implementation, allowing different
/// storage backends to be used. In production, use `Arc<ShardedStorage>`.
#[derive(Clone)]
pub struct WindowRegistry<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    storage: S,
    clock: Arc<dyn Clock>,
    default_policy: FixedWindowPolicy,
}

impl<S> WindowRegistry<S>
where
    S: Storage<NotificationKey, RateWindow> + Clone,
{
    /// Create a new registry with storage, clock, and a default policy.
    pub fn new(storage: S, clock: Arc<dyn Clock>, default_policy: FixedWindowPolicy) -> Self {
        Self {
            storage,
            clock,
            default_policy,
        }
    }

    /// Access or create the window for a key with a callback.
    ///
    /// A missing window is created empty (count 0) with a reset time of
    /// `now + policy.window_ms()`, so the callback always sees a window
    /// and decides admission itself. The callback receives the window and
    /// the current time in milliseconds.
    pub fn with_window<F, R>(&self, key: NotificationKey, policy: &FixedWindowPolicy, f: F) -> R
    where
        F: FnOnce(&mut RateWindow, u64) -> R,
    {
        let now = self.clock.now_millis();
        let window_ms = policy.window_ms();
        self.storage.with_entry_mut(
            key,
            || RateWindow::pending(now, window_ms),
            |window| f(window, now),
        )
    }

    /// Get a copy of the window stored for a key.
    pub fn window(&self, key: &NotificationKey) -> Option<RateWindow> {
        self.storage.get_cloned(key)
    }

    /// Remove every window whose reset time has passed.
    ///
    /// Returns the number of windows removed. Windows with a future reset
    /// time are left unchanged.
    pub fn remove_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let mut removed = 0;
        self.storage.retain(|_, window| {
            if window.is_expired(now) {
                removed += 1;
                false
            } else {
                true
            }
        });
        removed
    }

    /// Get the default policy.
    pub fn default_policy(&self) -> &FixedWindowPolicy {
        &self.default_policy
    }

    /// Get the number of tracked windows.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Clear all tracked state.
    pub fn clear(&self) {
        self.storage.clear();
    }
}

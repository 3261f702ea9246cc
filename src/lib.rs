//! # notification-throttle
//!
//! Process-local, best-effort rate limiting for user notifications.
//!
//! Each user gets a fixed counting window stored under the key
//! `"notifications:" + user_id`. A notification is admitted while the
//! window holds fewer than `max_notifications` admissions; once full, checks
//! return `false` and log a warning naming the user until the window
//! expires. A background task sweeps expired windows so idle users do not
//! pin memory.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use notification_throttle::NotificationThrottle;
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! // 10 notifications per user per minute, swept every 5 minutes
//! let throttle = NotificationThrottle::builder()
//!     .with_max_notifications(10)
//!     .with_window(Duration::from_secs(60))
//!     .with_cleanup_interval(Duration::from_secs(300))
//!     .build()?;
//! throttle.start_cleanup();
//!
//! if throttle.check_notification_rate_limit("user-42") {
//!     // send the notification
//! }
//!
//! // On service shutdown
//! throttle.shutdown().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Fixed Windows
//!
//! The window starts at the first notification and lasts `window_ms`.
//! It is not sliding: a user can receive up to `2 * max_notifications`
//! in a short span that straddles a window boundary. This is accepted for
//! best-effort throttling.
//!
//! ```rust
//! use notification_throttle::{FixedWindowPolicy, NotificationThrottle};
//! use notification_throttle::infrastructure::mocks::MockClock;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(MockClock::new(0));
//! let throttle = NotificationThrottle::builder()
//!     .with_clock(clock.clone())
//!     .build()
//!     .unwrap();
//! let policy = FixedWindowPolicy::from_millis(2, 1_000).unwrap();
//!
//! assert!(throttle.check_notification_rate_limit_with("u1", &policy));
//! assert!(throttle.check_notification_rate_limit_with("u1", &policy));
//! assert!(!throttle.check_notification_rate_limit_with("u1", &policy));
//!
//! clock.set_millis(1_001);
//! assert!(throttle.check_notification_rate_limit_with("u1", &policy));
//! assert_eq!(throttle.window("u1").unwrap().reset_time, 2_001);
//! ```
//!
//! ## Configuration
//!
//! Settings can come from any serde format through [`ThrottleConfig`]:
//!
//! ```rust
//! use notification_throttle::{NotificationThrottle, ThrottleConfig};
//!
//! let config: ThrottleConfig = serde_json::from_str(r#"{"max_notifications": 5}"#).unwrap();
//! let throttle = NotificationThrottle::builder()
//!     .with_config(&config)
//!     .build()
//!     .unwrap();
//! assert_eq!(throttle.policy().max_notifications(), 5);
//! assert_eq!(throttle.policy().window_ms(), 60_000);
//! ```
//!
//! ## Observability
//!
//! Throttled checks log at `WARN` with a `user_id` field. Sweeps log at
//! `DEBUG`. Counters are available through [`Metrics`]:
//!
//! ```rust,no_run
//! # use notification_throttle::NotificationThrottle;
//! # let throttle = NotificationThrottle::new();
//! let snapshot = throttle.metrics().snapshot();
//! println!("throttled: {:.1}%", snapshot.throttle_rate() * 100.0);
//! println!("windows evicted: {}", snapshot.windows_evicted);
//! ```

// Domain layer - pure business logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - external adapters
pub mod infrastructure;

pub mod config;

pub use domain::{
    key::NotificationKey,
    policy::{Admission, FixedWindowPolicy, PolicyError},
    window::RateWindow,
};

pub use application::{
    limiter::NotificationRateLimiter,
    metrics::{Metrics, MetricsSnapshot},
    ports::{Clock, Storage},
    registry::WindowRegistry,
    sweeper::{CleanupSweeper, SweeperConfig, SweeperConfigError},
};

#[cfg(feature = "async")]
pub use application::sweeper::{ShutdownError, SweeperHandle};

pub use config::ThrottleConfig;

pub use infrastructure::{
    clock::SystemClock,
    storage::ShardedStorage,
    throttle::{BuildError, NotificationThrottle, NotificationThrottleBuilder},
};

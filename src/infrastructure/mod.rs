//! Infrastructure layer - external adapters and integrations.
//!
//! This layer provides adapters for:
//! - Clock abstraction (system time vs mock)
//! - Storage implementations (sharded maps)
//! - The `NotificationThrottle` facade services construct at startup

pub mod clock;
pub mod storage;
pub mod throttle;

/// Mock implementations for testing.
///
/// Only available with the `test-helpers` feature or in test builds.
/// `MockClock` controls time and `MockCaptureLayer` records the warnings
/// logged on throttled checks.
///
/// To use these mocks in integration tests, add to your `Cargo.toml`:
/// ```toml
/// [dev-dependencies]
/// notification-throttle = { version = "*", features = ["test-helpers"] }
/// ```
#[cfg(any(test, feature = "test-helpers"))]
pub mod mocks;

//! Tests for the warnings emitted when notifications are throttled.

use notification_throttle::infrastructure::mocks::{MockCaptureLayer, MockClock};
use notification_throttle::NotificationThrottle;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

fn throttle(max: u32) -> NotificationThrottle {
    NotificationThrottle::builder()
        .with_max_notifications(max)
        .with_clock(Arc::new(MockClock::new(0)))
        .build()
        .unwrap()
}

#[test]
fn test_no_warning_while_admitted() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let throttle = throttle(3);

    tracing::subscriber::with_default(subscriber, || {
        for _ in 0..3 {
            assert!(throttle.check_notification_rate_limit("u1"));
        }
    });

    assert!(capture.at_level(Level::WARN).is_empty());
}

#[test]
fn test_one_warning_per_throttled_check() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let throttle = throttle(1);

    tracing::subscriber::with_default(subscriber, || {
        throttle.check_notification_rate_limit("alice");
        for _ in 0..4 {
            assert!(!throttle.check_notification_rate_limit("alice"));
        }
        throttle.check_notification_rate_limit("bob");
    });

    let warnings = capture.at_level(Level::WARN);
    assert_eq!(warnings.len(), 4);
    assert!(warnings
        .iter()
        .all(|event| event.user_id.as_deref() == Some("alice")));
}

#[test]
fn test_warning_names_each_throttled_user() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let throttle = throttle(1);

    tracing::subscriber::with_default(subscriber, || {
        for user in ["alice", "bob", "alice", "bob"] {
            throttle.check_notification_rate_limit(user);
        }
    });

    let users: Vec<String> = capture
        .at_level(Level::WARN)
        .into_iter()
        .filter_map(|event| event.user_id)
        .collect();
    assert_eq!(users, vec!["alice".to_string(), "bob".to_string()]);
}

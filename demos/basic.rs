//! Throttle a burst of notifications for two users.
//!
//! Run with `RUST_LOG=notification_throttle=debug cargo run --example basic`.

use notification_throttle::{NotificationThrottle, ThrottleConfig};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config: ThrottleConfig = serde_json::from_str(
        r#"{ "max_notifications": 3, "window_ms": 1000, "cleanup_interval_ms": 2000 }"#,
    )?;
    let throttle = NotificationThrottle::builder().with_config(&config).build()?;
    throttle.start_cleanup();

    for round in 0..2 {
        for user in ["alice", "bob"] {
            let sent = (0..5)
                .filter(|_| throttle.check_notification_rate_limit(user))
                .count();
            println!("round {}: {} notifications sent to {}", round, sent, user);
        }
        tokio::time::sleep(Duration::from_millis(1_100)).await;
    }

    tokio::time::sleep(Duration::from_millis(2_000)).await;
    println!(
        "tracked windows after cleanup: {}",
        throttle.tracked_windows()
    );

    let snapshot = throttle.metrics().snapshot();
    println!(
        "admitted: {}, throttled: {} ({:.0}%)",
        snapshot.notifications_admitted,
        snapshot.notifications_throttled,
        snapshot.throttle_rate() * 100.0
    );

    throttle.shutdown().await?;
    Ok(())
}

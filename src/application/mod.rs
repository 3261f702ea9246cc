//! Application layer - orchestration of domain logic.
//!
//! This layer coordinates the domain logic and manages the runtime behavior:
//! - Window registry (storage of per-user windows)
//! - Rate limiter (admission decisions and cleanup)
//! - Cleanup sweeper (periodic eviction of expired windows)
//!
//! ## Ports
//!
//! The application layer defines ports (traits) that infrastructure
//! adapters must implement. This keeps the application layer independent
//! from infrastructure details.

pub mod limiter;
pub mod metrics;
pub mod ports;
pub mod registry;
pub mod sweeper;

//! Domain layer - pure business logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of notification throttling:
//! - Notification keys derived from user ids
//! - Fixed counting windows
//! - The fixed-window admission policy
//!
//! All types in this layer are pure and easily testable.

pub mod key;
pub mod policy;
pub mod window;

//! Data models
//!
//! Shared between feast-server (persisted as JSON in redb) and clients
//! (over the wire). Order ids are `u64`, user ids are usernames.

pub mod geo;
pub mod menu;
pub mod order;
pub mod partition;
pub mod user;

// Re-exports
pub use geo::*;
pub use menu::*;
pub use order::*;
pub use partition::*;
pub use user::*;

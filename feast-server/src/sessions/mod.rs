//! Live restaurant sessions

pub mod registry;

pub use registry::{ConnectionId, RestaurantSession, RestaurantSessionRegistry};

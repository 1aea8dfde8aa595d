//! 订单模块 - order persistence, state machine and delivery matching
//!
//! ```text
//!   handlers ──▶ OrderLifecycle ──▶ OrderStore (redb)
//!                     ▲                  │
//!   handlers ──▶ DeliveryMatcher ◀───────┘ readyForPickup
//! ```

pub mod lifecycle;
pub mod matcher;
pub mod storage;

pub use lifecycle::{LifecycleConfig, NewOrder, OrderLifecycle};
pub use matcher::DeliveryMatcher;
pub use storage::OrderStore;

//! Shared types for the Feast ordering platform
//!
//! Types used by both `feast-server` and `feast-client`: the line-delimited
//! JSON protocol, domain models, error codes and geographic helpers.

pub mod error;
pub mod message;
pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use message::{Request, RequestKind, Response};
pub use models::{
    DeliveryOffer, GeoPoint, MenuItem, Order, OrderLine, OrderStatus, Partition, PaymentCard, Role,
    RoleKind, User, UserProfile,
};

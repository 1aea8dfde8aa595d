//! Order Model

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geo::GeoPoint;

/// Order lifecycle status
///
/// ```text
/// Pending ──▶ ReadyForPickup ──▶ PickedUp ──▶ Delivered
///    │              │
///    └──────┬───────┘
///           ▼
///       Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    ReadyForPickup,
    PickedUp,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and Cancelled are final
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::ReadyForPickup)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "Pending"),
            OrderStatus::ReadyForPickup => write!(f, "ReadyForPickup"),
            OrderStatus::PickedUp => write!(f, "PickedUp"),
            OrderStatus::Delivered => write!(f, "Delivered"),
            OrderStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Line item snapshot taken at checkout
///
/// Not a reference to the menu item: menu prices may change after ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Monotonically assigned, never reused
    pub id: u64,
    /// Creation time (Unix millis)
    pub created_at: i64,
    /// Last transition time (Unix millis)
    pub updated_at: i64,
    pub items: Vec<OrderLine>,
    /// Customer username
    pub customer: String,
    /// Restaurant username
    pub restaurant: String,
    pub delivery_address: String,
    pub restaurant_address: String,
    /// Courier username, set on pickup
    #[serde(default)]
    pub courier: Option<String>,
    /// Σ unit_price × quantity
    pub total: f64,
    #[serde(default)]
    pub note: String,
    pub status: OrderStatus,
    /// Restaurant coordinates cached at creation (the pickup point)
    #[serde(default)]
    pub pickup_location: Option<GeoPoint>,
    /// Delivery address coordinates cached at creation
    #[serde(default)]
    pub dropoff_location: Option<GeoPoint>,
}

/// Order with the courier's distance to its pickup point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOffer {
    pub order: Order,
    pub distance_km: f64,
}

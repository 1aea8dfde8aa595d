use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, PaymentCard, RoleKind};

// ==================== Account ====================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupPayload {
    pub username: String,
    pub password: String,
    pub role: RoleKind,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Restaurants only
    #[serde(default)]
    pub cuisine: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub username: String,
    pub password: String,
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Restaurants only
    #[serde(default)]
    pub cuisine: Option<String>,
    /// Restaurants only
    #[serde(default)]
    pub has_image: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAccountPayload {
    pub password: String,
}

// ==================== Catalog ====================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantQuery {
    #[serde(default)]
    pub cuisine: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestaurantRef {
    pub restaurant: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemRef {
    pub name: String,
}

// ==================== Orders ====================

/// Requested quantity of a menu item, resolved against the live menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderPayload {
    pub restaurant: String,
    pub items: Vec<CartLine>,
    #[serde(default)]
    pub note: String,
    /// Defaults to the customer's profile address
    #[serde(default)]
    pub delivery_address: Option<String>,
    /// Defaults to the customer's saved card
    #[serde(default)]
    pub payment: Option<PaymentCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRef {
    pub order_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancelOrderPayload {
    pub order_id: u64,
    #[serde(default)]
    pub reason: Option<String>,
}

// ==================== Delivery ====================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliverySearch {
    /// Defaults to the courier's profile location
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Defaults to the server's search radius
    #[serde(default)]
    pub max_km: Option<f64>,
}

// ==================== Admin ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub username: String,
}

// ==================== Notifications ====================

/// New-order notice queued for a restaurant session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderNotification {
    pub order_id: u64,
    pub customer: String,
    pub total: f64,
    /// Unix millis
    pub created_at: i64,
}

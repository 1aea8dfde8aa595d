//! Wire protocol
//!
//! 一行一个 JSON 对象 (newline-delimited JSON) over a persistent TCP stream.
//! Every request carries a `type` tag; the server answers each request line
//! with exactly one [`Response`] line, in order.
//!
//! ```text
//! client ──▶ {"type":"login","username":"alice","password":"..."}\n
//! server ◀── {"type":"login","success":true,"message":"Logged in","data":{...}}\n
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{MenuItemCreate, MenuItemUpdate, PaymentCard};

pub mod payload;
mod response;

pub use payload::*;
pub use response::Response;

/// Request tag
///
/// Closed set of operations the server understands. Decoding the tag on its
/// own lets the dispatcher tell an unknown operation apart from a known one
/// with bad fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Signup,
    Login,
    Logout,
    GetProfile,
    UpdateProfile,
    DeleteAccount,
    SavePayment,
    GetRestaurants,
    GetMenu,
    AddMenuItem,
    UpdateMenuItem,
    RemoveMenuItem,
    PlaceOrder,
    GetOrders,
    GetOrder,
    GetNotifications,
    MarkReady,
    FindDeliveries,
    PickUp,
    MarkDelivered,
    CancelOrder,
    ListUsers,
    DeleteUser,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Signup => "signup",
            RequestKind::Login => "login",
            RequestKind::Logout => "logout",
            RequestKind::GetProfile => "get_profile",
            RequestKind::UpdateProfile => "update_profile",
            RequestKind::DeleteAccount => "delete_account",
            RequestKind::SavePayment => "save_payment",
            RequestKind::GetRestaurants => "get_restaurants",
            RequestKind::GetMenu => "get_menu",
            RequestKind::AddMenuItem => "add_menu_item",
            RequestKind::UpdateMenuItem => "update_menu_item",
            RequestKind::RemoveMenuItem => "remove_menu_item",
            RequestKind::PlaceOrder => "place_order",
            RequestKind::GetOrders => "get_orders",
            RequestKind::GetOrder => "get_order",
            RequestKind::GetNotifications => "get_notifications",
            RequestKind::MarkReady => "mark_ready",
            RequestKind::FindDeliveries => "find_deliveries",
            RequestKind::PickUp => "pick_up",
            RequestKind::MarkDelivered => "mark_delivered",
            RequestKind::CancelOrder => "cancel_order",
            RequestKind::ListUsers => "list_users",
            RequestKind::DeleteUser => "delete_user",
        }
    }

    /// Whether the request needs a logged-in session
    pub fn requires_session(&self) -> bool {
        !matches!(self, RequestKind::Signup | RequestKind::Login)
    }

    /// Parse a raw `type` tag
    pub fn parse(tag: &str) -> Option<Self> {
        serde_json::from_value(serde_json::Value::String(tag.to_string())).ok()
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed client request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    // ========== Account ==========
    Signup(SignupPayload),
    Login(LoginPayload),
    Logout,
    GetProfile,
    UpdateProfile(ProfileUpdate),
    DeleteAccount(DeleteAccountPayload),
    SavePayment(PaymentCard),

    // ========== Catalog ==========
    GetRestaurants(RestaurantQuery),
    GetMenu(RestaurantRef),
    AddMenuItem(MenuItemCreate),
    UpdateMenuItem(MenuItemUpdate),
    RemoveMenuItem(MenuItemRef),

    // ========== Orders ==========
    PlaceOrder(PlaceOrderPayload),
    GetOrders,
    GetOrder(OrderRef),
    GetNotifications,
    MarkReady(OrderRef),

    // ========== Delivery ==========
    FindDeliveries(DeliverySearch),
    PickUp(OrderRef),
    MarkDelivered,

    // ========== Admin ==========
    CancelOrder(CancelOrderPayload),
    ListUsers,
    DeleteUser(UserRef),
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Signup(_) => RequestKind::Signup,
            Request::Login(_) => RequestKind::Login,
            Request::Logout => RequestKind::Logout,
            Request::GetProfile => RequestKind::GetProfile,
            Request::UpdateProfile(_) => RequestKind::UpdateProfile,
            Request::DeleteAccount(_) => RequestKind::DeleteAccount,
            Request::SavePayment(_) => RequestKind::SavePayment,
            Request::GetRestaurants(_) => RequestKind::GetRestaurants,
            Request::GetMenu(_) => RequestKind::GetMenu,
            Request::AddMenuItem(_) => RequestKind::AddMenuItem,
            Request::UpdateMenuItem(_) => RequestKind::UpdateMenuItem,
            Request::RemoveMenuItem(_) => RequestKind::RemoveMenuItem,
            Request::PlaceOrder(_) => RequestKind::PlaceOrder,
            Request::GetOrders => RequestKind::GetOrders,
            Request::GetOrder(_) => RequestKind::GetOrder,
            Request::GetNotifications => RequestKind::GetNotifications,
            Request::MarkReady(_) => RequestKind::MarkReady,
            Request::FindDeliveries(_) => RequestKind::FindDeliveries,
            Request::PickUp(_) => RequestKind::PickUp,
            Request::MarkDelivered => RequestKind::MarkDelivered,
            Request::CancelOrder(_) => RequestKind::CancelOrder,
            Request::ListUsers => RequestKind::ListUsers,
            Request::DeleteUser(_) => RequestKind::DeleteUser,
        }
    }

    /// Encode as one protocol line (without the trailing newline)
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn login(username: impl Into<String>, password: impl Into<String>) -> Self {
        Request::Login(LoginPayload {
            username: username.into(),
            password: password.into(),
        })
    }
}

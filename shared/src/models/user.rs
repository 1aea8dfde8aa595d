//! User Model
//!
//! One account type with role-specific state. Usernames are the account id
//! and are unique across all roles.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::geo::GeoPoint;
use super::menu::MenuItem;

/// Saved payment instrument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCard {
    pub card_number: String,
    /// `MM/YY`
    pub expiry: String,
    pub cvv: String,
}

impl PaymentCard {
    /// Card number with everything but the last four digits hidden
    pub fn masked(&self) -> String {
        let digits: Vec<char> = self.card_number.chars().filter(|c| c.is_ascii_digit()).collect();
        let tail: String = digits.iter().skip(digits.len().saturating_sub(4)).collect();
        format!("**** {}", tail)
    }
}

/// Role discriminator (used by signup and listings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleKind {
    Customer,
    Restaurant,
    Courier,
    Admin,
}

impl fmt::Display for RoleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoleKind::Customer => write!(f, "customer"),
            RoleKind::Restaurant => write!(f, "restaurant"),
            RoleKind::Courier => write!(f, "courier"),
            RoleKind::Admin => write!(f, "admin"),
        }
    }
}

/// Role-specific state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Role {
    Customer {
        #[serde(default)]
        payment: Option<PaymentCard>,
        /// Sum of order totals charged to this customer
        #[serde(default)]
        total_spent: f64,
    },
    Restaurant {
        #[serde(default)]
        cuisine: String,
        #[serde(default)]
        menu: Vec<MenuItem>,
        #[serde(default)]
        revenue: f64,
        #[serde(default)]
        has_image: bool,
        #[serde(default)]
        accepted_orders: Vec<u64>,
    },
    Courier {
        #[serde(default)]
        income: f64,
        /// At most one delivery at a time
        #[serde(default)]
        active_delivery: Option<u64>,
    },
    Admin,
}

impl Role {
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Customer { .. } => RoleKind::Customer,
            Role::Restaurant { .. } => RoleKind::Restaurant,
            Role::Courier { .. } => RoleKind::Courier,
            Role::Admin => RoleKind::Admin,
        }
    }

    /// Fresh role state for a new account
    pub fn new_for(kind: RoleKind, cuisine: Option<String>) -> Self {
        match kind {
            RoleKind::Customer => Role::Customer {
                payment: None,
                total_spent: 0.0,
            },
            RoleKind::Restaurant => Role::Restaurant {
                cuisine: cuisine.unwrap_or_default(),
                menu: Vec::new(),
                revenue: 0.0,
                has_image: false,
                accepted_orders: Vec::new(),
            },
            RoleKind::Courier => Role::Courier {
                income: 0.0,
                active_delivery: None,
            },
            RoleKind::Admin => Role::Admin,
        }
    }
}

/// Persisted account record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique, immutable
    pub username: String,
    pub password_hash: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    /// Derived from `address` by the geocoder
    #[serde(default)]
    pub location: Option<GeoPoint>,
    /// Unix millis
    pub created_at: i64,
    pub role: Role,
}

impl User {
    pub fn kind(&self) -> RoleKind {
        self.role.kind()
    }

    pub fn is_customer(&self) -> bool {
        matches!(self.role, Role::Customer { .. })
    }

    pub fn is_restaurant(&self) -> bool {
        matches!(self.role, Role::Restaurant { .. })
    }

    pub fn is_courier(&self) -> bool {
        matches!(self.role, Role::Courier { .. })
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    pub fn menu(&self) -> Option<&[MenuItem]> {
        match &self.role {
            Role::Restaurant { menu, .. } => Some(menu),
            _ => None,
        }
    }

    /// Public view without the password hash or full card number
    pub fn profile(&self) -> UserProfile {
        let role = match &self.role {
            Role::Customer {
                payment,
                total_spent,
            } => RoleProfile::Customer {
                payment: payment.as_ref().map(PaymentCard::masked),
                total_spent: *total_spent,
            },
            Role::Restaurant {
                cuisine,
                menu,
                revenue,
                has_image,
                accepted_orders,
            } => RoleProfile::Restaurant {
                cuisine: cuisine.clone(),
                menu_size: menu.len(),
                revenue: *revenue,
                has_image: *has_image,
                accepted_orders: accepted_orders.clone(),
            },
            Role::Courier {
                income,
                active_delivery,
            } => RoleProfile::Courier {
                income: *income,
                active_delivery: *active_delivery,
            },
            Role::Admin => RoleProfile::Admin,
        };
        UserProfile {
            username: self.username.clone(),
            address: self.address.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            location: self.location,
            role,
        }
    }
}

/// Account as shown to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub location: Option<GeoPoint>,
    pub role: RoleProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoleProfile {
    Customer {
        payment: Option<String>,
        total_spent: f64,
    },
    Restaurant {
        cuisine: String,
        menu_size: usize,
        revenue: f64,
        has_image: bool,
        accepted_orders: Vec<u64>,
    },
    Courier {
        income: f64,
        active_delivery: Option<u64>,
    },
    Admin,
}

/// Online restaurant as listed to customers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantSummary {
    pub username: String,
    pub cuisine: String,
    pub address: String,
    pub phone: String,
    pub has_image: bool,
    /// Distance from the caller, when both sides have coordinates
    pub distance_km: Option<f64>,
}

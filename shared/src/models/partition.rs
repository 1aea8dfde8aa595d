//! Status-partitioned order views
//!
//! An order is projected into up to four named partitions depending on its
//! status. The table below is the single source of truth; the order store
//! reconciles stored membership against [`Partition::for_order`].
//!
//! | Status | restaurant | customer | readyForPickup | courier |
//! |---|---|---|---|---|
//! | Pending | yes | yes | no | no |
//! | ReadyForPickup | no | yes | yes | no |
//! | PickedUp | no | yes | no | yes |
//! | Delivered | no | yes | no | no |
//! | Cancelled | no | yes | no | no |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::order::{Order, OrderStatus};

pub const READY_FOR_PICKUP_KEY: &str = "readyForPickup";

/// Partition key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Partition {
    /// `restaurant:<id>` - the restaurant's current (pending) orders
    Restaurant(String),
    /// `customer:<id>` - the customer's full order history
    Customer(String),
    /// `readyForPickup` - global pool searched by couriers
    ReadyForPickup,
    /// `courier:<id>` - the courier's in-flight delivery
    Courier(String),
}

impl Partition {
    /// Exact partition set an order must belong to, given its current status
    pub fn for_order(order: &Order) -> Vec<Partition> {
        let mut partitions = vec![Partition::Customer(order.customer.clone())];
        match order.status {
            OrderStatus::Pending => {
                partitions.push(Partition::Restaurant(order.restaurant.clone()));
            }
            OrderStatus::ReadyForPickup => partitions.push(Partition::ReadyForPickup),
            OrderStatus::PickedUp => {
                if let Some(courier) = &order.courier {
                    partitions.push(Partition::Courier(courier.clone()));
                }
            }
            OrderStatus::Delivered | OrderStatus::Cancelled => {}
        }
        partitions.sort();
        partitions
    }

    /// Storage key, e.g. `restaurant:bob`
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Partition::Restaurant(id) => write!(f, "restaurant:{}", id),
            Partition::Customer(id) => write!(f, "customer:{}", id),
            Partition::ReadyForPickup => write!(f, "{}", READY_FOR_PICKUP_KEY),
            Partition::Courier(id) => write!(f, "courier:{}", id),
        }
    }
}

/// Error parsing a partition key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid partition key: {0}")]
pub struct InvalidPartitionKey(pub String);

impl FromStr for Partition {
    type Err = InvalidPartitionKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == READY_FOR_PICKUP_KEY {
            return Ok(Partition::ReadyForPickup);
        }
        let (prefix, id) = s
            .split_once(':')
            .ok_or_else(|| InvalidPartitionKey(s.to_string()))?;
        if id.is_empty() {
            return Err(InvalidPartitionKey(s.to_string()));
        }
        match prefix {
            "restaurant" => Ok(Partition::Restaurant(id.to_string())),
            "customer" => Ok(Partition::Customer(id.to_string())),
            "courier" => Ok(Partition::Courier(id.to_string())),
            _ => Err(InvalidPartitionKey(s.to_string())),
        }
    }
}

impl From<Partition> for String {
    fn from(p: Partition) -> Self {
        p.to_string()
    }
}

impl TryFrom<String> for Partition {
    type Error = InvalidPartitionKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(status: OrderStatus, courier: Option<&str>) -> Order {
        Order {
            id: 1,
            created_at: 0,
            updated_at: 0,
            items: vec![],
            customer: "alice".into(),
            restaurant: "bob".into(),
            delivery_address: "1 Main St".into(),
            restaurant_address: "2 Main St".into(),
            courier: courier.map(str::to_string),
            total: 0.0,
            note: String::new(),
            status,
            pickup_location: None,
            dropoff_location: None,
        }
    }

    #[test]
    fn test_membership_table() {
        let alice = Partition::Customer("alice".into());
        let bob = Partition::Restaurant("bob".into());
        let carl = Partition::Courier("carl".into());

        let pending = Partition::for_order(&order(OrderStatus::Pending, None));
        assert_eq!(pending.len(), 2);
        assert!(pending.contains(&alice) && pending.contains(&bob));

        let ready = Partition::for_order(&order(OrderStatus::ReadyForPickup, None));
        assert_eq!(ready.len(), 2);
        assert!(ready.contains(&alice) && ready.contains(&Partition::ReadyForPickup));

        let picked = Partition::for_order(&order(OrderStatus::PickedUp, Some("carl")));
        assert_eq!(picked.len(), 2);
        assert!(picked.contains(&alice) && picked.contains(&carl));

        for status in [OrderStatus::Delivered, OrderStatus::Cancelled] {
            assert_eq!(
                Partition::for_order(&order(status, Some("carl"))),
                vec![alice.clone()]
            );
        }
    }

    #[test]
    fn test_key_parse_roundtrip() {
        for key in ["restaurant:bob", "customer:alice", "readyForPickup", "courier:carl"] {
            let p: Partition = key.parse().unwrap();
            assert_eq!(p.key(), key);
        }
    }

    #[test]
    fn test_key_parse_rejects_garbage() {
        assert!("kitchen:bob".parse::<Partition>().is_err());
        assert!("customer:".parse::<Partition>().is_err());
        assert!("readyforpickup".parse::<Partition>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Partition::Courier("carl".into())).unwrap();
        assert_eq!(json, "\"courier:carl\"");
        let p: Partition = serde_json::from_str("\"readyForPickup\"").unwrap();
        assert_eq!(p, Partition::ReadyForPickup);
    }
}

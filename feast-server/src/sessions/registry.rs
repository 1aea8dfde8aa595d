//! RestaurantSessionRegistry - which restaurants are online
//!
//! A restaurant is online between `login` and `logout`/disconnect of the
//! connection that logged it in. Only online restaurants are listed to
//! customers and may receive new orders; going offline never touches orders
//! already placed.
//!
//! New-order notices are queued per session and drained by the restaurant
//! with `get_notifications` (responses are strictly request/response, there
//! is no out-of-band push).

use dashmap::DashMap;
use shared::message::OrderNotification;

/// Connection handle, unique per accepted connection
pub type ConnectionId = u64;

#[derive(Debug, Clone)]
pub struct RestaurantSession {
    pub restaurant: String,
    pub connection: ConnectionId,
    /// Unix millis
    pub connected_at: i64,
    pub pending: Vec<OrderNotification>,
}

#[derive(Debug, Default)]
pub struct RestaurantSessionRegistry {
    sessions: DashMap<String, RestaurantSession>,
}

impl RestaurantSessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the restaurant online for this connection
    ///
    /// A newer login replaces an older session; queued notices carry over.
    pub fn on_login(&self, restaurant: &str, connection: ConnectionId) {
        let connected_at = crate::utils::time::now_millis();
        self.sessions
            .entry(restaurant.to_string())
            .and_modify(|s| {
                s.connection = connection;
                s.connected_at = connected_at;
            })
            .or_insert_with(|| RestaurantSession {
                restaurant: restaurant.to_string(),
                connection,
                connected_at,
                pending: Vec::new(),
            });
        tracing::info!(restaurant = %restaurant, connection, "restaurant online");
    }

    /// Mark the restaurant offline, but only if `connection` still owns the
    /// session (a stale disconnect must not evict a newer login)
    pub fn on_logout(&self, restaurant: &str, connection: ConnectionId) -> bool {
        let removed = self
            .sessions
            .remove_if(restaurant, |_, s| s.connection == connection)
            .is_some();
        if removed {
            tracing::info!(restaurant = %restaurant, connection, "restaurant offline");
        }
        removed
    }

    /// Drop the session regardless of owner (account deleted)
    pub fn evict(&self, restaurant: &str) {
        self.sessions.remove(restaurant);
    }

    pub fn is_online(&self, restaurant: &str) -> bool {
        self.sessions.contains_key(restaurant)
    }

    /// Online restaurants, sorted by name
    pub fn list_online(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Queue a new-order notice; returns false when the restaurant is offline
    pub fn notify(&self, restaurant: &str, notification: OrderNotification) -> bool {
        match self.sessions.get_mut(restaurant) {
            Some(mut session) => {
                session.pending.push(notification);
                true
            }
            None => false,
        }
    }

    /// Take all queued notices, oldest first
    pub fn drain_notifications(&self, restaurant: &str) -> Vec<OrderNotification> {
        self.sessions
            .get_mut(restaurant)
            .map(|mut s| std::mem::take(&mut s.pending))
            .unwrap_or_default()
    }
}

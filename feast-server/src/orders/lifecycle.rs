//! OrderLifecycle - the order state machine
//!
//! ```text
//! create ──▶ Pending ──mark_ready──▶ ReadyForPickup ──pick_up──▶ PickedUp ──mark_delivered──▶ Delivered
//!               │                          │
//!               └────────── cancel ────────┴──▶ Cancelled
//! ```
//!
//! Each transition reads, checks, writes the order through the order store
//! and applies its account side effects inside ONE redb write transaction.
//! Nothing is visible until commit, and an error at any step drops the
//! transaction, so a failed transition leaves the previous state intact.
//!
//! Collaborator calls (geocoding, payment) are async and happen before the
//! transaction is opened; no transaction is ever held across an `.await`.

use std::sync::Arc;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{CartLine, OrderNotification};
use shared::models::{GeoPoint, Order, OrderLine, OrderStatus, PaymentCard, Partition, Role, User};

use super::storage::{self, OrderStore};
use crate::db::{Storage, StorageError};
use crate::services::{GeoLocationProvider, PaymentAuthenticator};
use crate::sessions::RestaurantSessionRegistry;
use crate::users::UserRegistry;
use crate::users::registry::{load_user, modify_user};
use crate::utils::money;
use crate::utils::time::now_millis;
use crate::utils::validation::{MAX_NOTE_LEN, validate_quantity};

/// Business constants of the lifecycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifecycleConfig {
    /// Max delivery-address ↔ restaurant distance accepted at checkout
    pub max_service_radius_km: f64,
    /// Fixed amount credited to the courier per delivery
    pub delivery_fee: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_service_radius_km: 20.0,
            delivery_fee: 5.0,
        }
    }
}

/// Checkout input
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub restaurant: String,
    pub items: Vec<CartLine>,
    pub note: String,
    /// Defaults to the customer's address
    pub delivery_address: Option<String>,
    /// Defaults to the customer's saved card
    pub payment: Option<PaymentCard>,
}

#[derive(Debug, Clone)]
pub struct OrderLifecycle {
    storage: Storage,
    orders: OrderStore,
    users: UserRegistry,
    sessions: Arc<RestaurantSessionRegistry>,
    geo: Arc<dyn GeoLocationProvider>,
    payment: Arc<dyn PaymentAuthenticator>,
    config: LifecycleConfig,
}

impl OrderLifecycle {
    pub fn new(
        users: UserRegistry,
        orders: OrderStore,
        sessions: Arc<RestaurantSessionRegistry>,
        geo: Arc<dyn GeoLocationProvider>,
        payment: Arc<dyn PaymentAuthenticator>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            storage: users.storage().clone(),
            orders,
            users,
            sessions,
            geo,
            payment,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    // ========== create ==========

    /// Checkout: validate, then persist a new Pending order
    pub async fn create(&self, customer: &str, input: NewOrder) -> AppResult<Order> {
        let customer_user = match self.users.find(customer)? {
            Some(user) if user.is_customer() => user,
            Some(_) => return Err(AppError::permission_denied("Only customers can place orders")),
            None => return Err(AppError::not_authenticated()),
        };

        if input.items.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyOrder));
        }
        for line in &input.items {
            validate_quantity(line.quantity)?;
        }
        if input.note.len() > MAX_NOTE_LEN {
            return Err(AppError::validation(format!("note is too long (max {MAX_NOTE_LEN})")));
        }

        let restaurant = match self.users.find(&input.restaurant)? {
            Some(user) if user.is_restaurant() => user,
            _ => {
                return Err(AppError::with_message(
                    ErrorCode::RestaurantNotFound,
                    format!("Restaurant not found: {}", input.restaurant),
                ));
            }
        };
        if !self.sessions.is_online(&restaurant.username) {
            return Err(AppError::with_message(
                ErrorCode::RestaurantOffline,
                format!("Restaurant {} is not accepting orders", restaurant.username),
            ));
        }

        let items = snapshot_lines(&restaurant, &input.items)?;
        let total = money::order_total(&items);

        let card = input
            .payment
            .clone()
            .or_else(|| match &customer_user.role {
                Role::Customer { payment, .. } => payment.clone(),
                _ => None,
            })
            .ok_or_else(|| AppError::with_message(ErrorCode::PaymentRejected, "No payment method on file"))?;
        if !self.payment.authenticate(&card).await {
            return Err(AppError::new(ErrorCode::PaymentRejected));
        }

        let delivery_address = input
            .delivery_address
            .clone()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| customer_user.address.clone());
        let dropoff = self.geo.resolve(&delivery_address).await.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::AddressUnresolvable,
                format!("Could not locate delivery address: {delivery_address}"),
            )
        })?;
        let pickup = self.locate(&restaurant).await.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::AddressUnresolvable,
                format!("Could not locate restaurant address: {}", restaurant.address),
            )
        })?;

        let distance = self.geo.distance_km(&pickup, &dropoff);
        if distance > self.config.max_service_radius_km {
            return Err(AppError::with_message(
                ErrorCode::OutOfServiceArea,
                format!(
                    "Delivery address is {:.1} km from the restaurant (max {:.1} km)",
                    distance, self.config.max_service_radius_km
                ),
            ));
        }

        let txn = self.storage.begin_write()?;
        // the restaurant may have been deleted while payment and geocoding ran
        if !load_user(&txn, &restaurant.username)?.is_some_and(|u| u.is_restaurant()) {
            return Err(AppError::with_message(
                ErrorCode::RestaurantNotFound,
                format!("Restaurant not found: {}", restaurant.username),
            ));
        }
        let now = now_millis();
        let order = Order {
            id: storage::next_order_id(&txn)?,
            created_at: now,
            updated_at: now,
            items,
            customer: customer_user.username.clone(),
            restaurant: restaurant.username.clone(),
            delivery_address,
            restaurant_address: restaurant.address.clone(),
            courier: None,
            total,
            note: input.note,
            status: OrderStatus::Pending,
            pickup_location: Some(pickup),
            dropoff_location: Some(dropoff),
        };
        storage::record_transition_txn(&txn, &order)?;
        modify_user(&txn, customer, |user| match &mut user.role {
            Role::Customer { total_spent, .. } => {
                *total_spent = money::add(*total_spent, total);
                Ok(())
            }
            _ => Err(AppError::permission_denied("Only customers can place orders")),
        })?;
        txn.commit().map_err(StorageError::from)?;

        self.sessions.notify(
            &order.restaurant,
            OrderNotification {
                order_id: order.id,
                customer: order.customer.clone(),
                total: order.total,
                created_at: order.created_at,
            },
        );

        tracing::info!(
            order_id = order.id,
            customer = %order.customer,
            restaurant = %order.restaurant,
            total = order.total,
            "order created"
        );
        Ok(order)
    }

    // ========== mark_ready_for_pickup ==========

    /// Pending → ReadyForPickup, by the owning restaurant
    pub fn mark_ready_for_pickup(&self, restaurant: &str, order_id: u64) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = load(&txn, order_id)?;
        if order.restaurant != restaurant {
            return Err(AppError::with_message(
                ErrorCode::NotOrderOwner,
                format!("Order {order_id} belongs to another restaurant"),
            ));
        }
        expect_status(&order, OrderStatus::Pending)?;

        order.status = OrderStatus::ReadyForPickup;
        order.updated_at = now_millis();
        storage::record_transition_txn(&txn, &order)?;
        modify_user(&txn, restaurant, |user| match &mut user.role {
            Role::Restaurant {
                accepted_orders,
                revenue,
                ..
            } => {
                accepted_orders.push(order_id);
                *revenue = money::add(*revenue, order.total);
                Ok(())
            }
            _ => Err(AppError::permission_denied("Only restaurants can mark orders ready")),
        })?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, restaurant = %restaurant, "order ready for pickup");
        Ok(order)
    }

    // ========== pick_up ==========

    /// ReadyForPickup → PickedUp; the courier must be free
    pub fn pick_up(&self, courier: &str, order_id: u64) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let courier_user = crate::users::registry::load_user(&txn, courier)?
            .ok_or_else(AppError::not_authenticated)?;
        match &courier_user.role {
            Role::Courier {
                active_delivery: Some(current),
                ..
            } => {
                return Err(AppError::with_message(
                    ErrorCode::CourierBusy,
                    format!("Courier is already delivering order {current}"),
                ));
            }
            Role::Courier { .. } => {}
            _ => return Err(AppError::permission_denied("Only couriers can pick up orders")),
        }

        let mut order = load(&txn, order_id)?;
        if !storage::contains_txn(&txn, &Partition::ReadyForPickup, order_id)? {
            return Err(AppError::with_message(
                ErrorCode::InvalidOrderStatus,
                format!("Order {order_id} is not ready for pickup (status {})", order.status),
            ));
        }

        order.status = OrderStatus::PickedUp;
        order.courier = Some(courier.to_string());
        order.updated_at = now_millis();
        storage::record_transition_txn(&txn, &order)?;
        modify_user(&txn, courier, |user| {
            if let Role::Courier { active_delivery, .. } = &mut user.role {
                *active_delivery = Some(order_id);
            }
            Ok(())
        })?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, courier = %courier, "order picked up");
        Ok(order)
    }

    // ========== mark_delivered ==========

    /// PickedUp → Delivered for the courier's active delivery
    pub fn mark_delivered(&self, courier: &str) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let courier_user = crate::users::registry::load_user(&txn, courier)?
            .ok_or_else(AppError::not_authenticated)?;
        let order_id = match &courier_user.role {
            Role::Courier {
                active_delivery: Some(id),
                ..
            } => *id,
            Role::Courier { .. } => return Err(AppError::new(ErrorCode::NoActiveDelivery)),
            _ => return Err(AppError::permission_denied("Only couriers can deliver orders")),
        };

        let mut order = load(&txn, order_id)?;
        expect_status(&order, OrderStatus::PickedUp)?;
        if order.courier.as_deref() != Some(courier) {
            return Err(AppError::with_message(
                ErrorCode::NotOrderOwner,
                format!("Order {order_id} is assigned to another courier"),
            ));
        }

        order.status = OrderStatus::Delivered;
        order.updated_at = now_millis();
        storage::record_transition_txn(&txn, &order)?;
        let fee = self.config.delivery_fee;
        modify_user(&txn, courier, |user| {
            if let Role::Courier {
                income,
                active_delivery,
            } = &mut user.role
            {
                *income = money::add(*income, fee);
                *active_delivery = None;
            }
            Ok(())
        })?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, courier = %courier, fee, "order delivered");
        Ok(order)
    }

    // ========== cancel ==========

    /// {Pending, ReadyForPickup} → Cancelled
    pub fn cancel(&self, order_id: u64, reason: &str) -> AppResult<Order> {
        let txn = self.storage.begin_write()?;
        let mut order = load(&txn, order_id)?;
        if !order.status.is_cancellable() {
            return Err(AppError::with_message(
                ErrorCode::InvalidOrderStatus,
                format!("Order {order_id} can not be cancelled (status {})", order.status),
            ));
        }

        order.status = OrderStatus::Cancelled;
        order.updated_at = now_millis();
        storage::record_transition_txn(&txn, &order)?;
        txn.commit().map_err(StorageError::from)?;

        tracing::info!(order_id, reason = %reason, "order cancelled");
        Ok(order)
    }

    // ========== helpers ==========

    /// Restaurant coordinates, cached on the account or resolved now
    pub(crate) async fn locate(&self, user: &User) -> Option<GeoPoint> {
        match user.location {
            Some(point) => Some(point),
            None => self.geo.resolve(&user.address).await,
        }
    }
}

fn load(txn: &redb::WriteTransaction, order_id: u64) -> AppResult<Order> {
    storage::load_order(txn, order_id)?.ok_or_else(|| AppError::order_not_found(order_id))
}

fn expect_status(order: &Order, expected: OrderStatus) -> AppResult<()> {
    if order.status != expected {
        return Err(AppError::with_message(
            ErrorCode::InvalidOrderStatus,
            format!("Order {} is {} (expected {})", order.id, order.status, expected),
        ));
    }
    Ok(())
}

/// Resolve cart lines against the live menu into price snapshots
fn snapshot_lines(restaurant: &User, cart: &[CartLine]) -> AppResult<Vec<OrderLine>> {
    let menu = restaurant.menu().unwrap_or_default();
    cart.iter()
        .map(|line| {
            let item = menu.iter().find(|m| m.name.eq_ignore_ascii_case(&line.name)).ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::MenuItemNotFound,
                    format!("{} has no menu item named {}", restaurant.username, line.name),
                )
            })?;
            if !item.available {
                return Err(AppError::with_message(
                    ErrorCode::MenuItemUnavailable,
                    format!("{} is not available", item.name),
                ));
            }
            Ok(OrderLine {
                name: item.name.clone(),
                unit_price: item.price,
                quantity: line.quantity,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{CardValidator, StaticGeocoder};
    use crate::users::Argon2Hasher;
    use shared::models::{MenuItem, RoleKind};

    const CARD: &str = "4111111111111111";

    struct Fixture {
        lifecycle: OrderLifecycle,
        users: UserRegistry,
        sessions: Arc<RestaurantSessionRegistry>,
        geo: Arc<StaticGeocoder>,
        origin: GeoPoint,
    }

    fn fixture() -> Fixture {
        let storage = Storage::open_in_memory().unwrap();
        let users = UserRegistry::new(storage.clone(), Arc::new(Argon2Hasher));
        let orders = OrderStore::new(storage);
        let sessions = Arc::new(RestaurantSessionRegistry::new());
        let geo = Arc::new(StaticGeocoder::new());
        let origin = GeoPoint::new(40.0, -86.0);
        geo.insert("bob st", origin);
        geo.insert("alice st", origin.offset_north_km(3.0));
        geo.insert("far away", origin.offset_north_km(50.0));

        let lifecycle = OrderLifecycle::new(
            users.clone(),
            orders,
            sessions.clone(),
            geo.clone(),
            Arc::new(CardValidator),
            LifecycleConfig::default(),
        );

        let mut alice = account("alice", RoleKind::Customer, "alice st");
        alice.role = Role::Customer {
            payment: Some(PaymentCard {
                card_number: CARD.into(),
                expiry: "12/99".into(),
                cvv: "123".into(),
            }),
            total_spent: 0.0,
        };
        users.create(alice).unwrap();

        let mut bob = account("bob", RoleKind::Restaurant, "bob st");
        bob.role = Role::Restaurant {
            cuisine: "diner".into(),
            menu: vec![item("A", 5.0, true), item("B", 3.0, true), item("C", 9.0, false)],
            revenue: 0.0,
            has_image: false,
            accepted_orders: vec![],
        };
        users.create(bob).unwrap();
        users.create(account("carl", RoleKind::Courier, "bob st")).unwrap();
        users.create(account("dave", RoleKind::Courier, "bob st")).unwrap();
        sessions.on_login("bob", 1);

        Fixture {
            lifecycle,
            users,
            sessions,
            geo,
            origin,
        }
    }

    fn account(name: &str, kind: RoleKind, address: &str) -> User {
        User {
            username: name.into(),
            password_hash: String::new(),
            address: address.into(),
            phone: "555".into(),
            email: format!("{name}@example.com"),
            location: None,
            created_at: 0,
            role: Role::new_for(kind, None),
        }
    }

    fn item(name: &str, price: f64, available: bool) -> MenuItem {
        MenuItem {
            name: name.into(),
            price,
            description: String::new(),
            photo: None,
            available,
        }
    }

    fn cart(lines: &[(&str, u32)]) -> NewOrder {
        NewOrder {
            restaurant: "bob".into(),
            items: lines
                .iter()
                .map(|(name, quantity)| CartLine {
                    name: name.to_string(),
                    quantity: *quantity,
                })
                .collect(),
            note: String::new(),
            delivery_address: None,
            payment: None,
        }
    }

    #[tokio::test]
    async fn test_create_computes_total_and_partitions() {
        let fx = fixture();
        let order = fx.lifecycle.create("alice", cart(&[("A", 2), ("B", 1)])).await.unwrap();
        assert_eq!(order.total, 13.0);
        assert_eq!(order.status, OrderStatus::Pending);
        let partitions = fx.lifecycle.orders().partitions_of(order.id).unwrap();
        assert_eq!(partitions.len(), 2);
        assert!(partitions.contains(&Partition::Restaurant("bob".into())));
        assert!(partitions.contains(&Partition::Customer("alice".into())));
        match fx.users.get("alice").unwrap().role {
            Role::Customer { total_spent, .. } => assert_eq!(total_spent, 13.0),
            other => panic!("unexpected {other:?}"),
        }
        let notes = fx.sessions.drain_notifications("bob");
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].order_id, order.id);
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let fx = fixture();
        let code = |r: AppResult<Order>| r.unwrap_err().code;

        assert_eq!(code(fx.lifecycle.create("ghost", cart(&[("A", 1)])).await), ErrorCode::NotAuthenticated);
        assert_eq!(code(fx.lifecycle.create("alice", cart(&[])).await), ErrorCode::EmptyOrder);
        assert_eq!(code(fx.lifecycle.create("alice", cart(&[("Z", 1)])).await), ErrorCode::MenuItemNotFound);
        assert_eq!(code(fx.lifecycle.create("alice", cart(&[("C", 1)])).await), ErrorCode::MenuItemUnavailable);
        assert_eq!(code(fx.lifecycle.create("alice", cart(&[("A", 0)])).await), ErrorCode::ValidationFailed);

        let mut far = cart(&[("A", 1)]);
        far.delivery_address = Some("far away".into());
        assert_eq!(code(fx.lifecycle.create("alice", far).await), ErrorCode::OutOfServiceArea);

        let mut lost = cart(&[("A", 1)]);
        lost.delivery_address = Some("atlantis".into());
        assert_eq!(code(fx.lifecycle.create("alice", lost).await), ErrorCode::AddressUnresolvable);

        let mut bad_card = cart(&[("A", 1)]);
        bad_card.payment = Some(PaymentCard {
            card_number: "4111111111111112".into(),
            expiry: "12/99".into(),
            cvv: "123".into(),
        });
        assert_eq!(code(fx.lifecycle.create("alice", bad_card).await), ErrorCode::PaymentRejected);

        fx.sessions.on_logout("bob", 1);
        assert_eq!(code(fx.lifecycle.create("alice", cart(&[("A", 1)])).await), ErrorCode::RestaurantOffline);

        // nothing was persisted and no id was burnt
        fx.sessions.on_login("bob", 2);
        let order = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();
        assert_eq!(order.id, 1);
    }

    #[tokio::test]
    async fn test_full_transition_chain() {
        let fx = fixture();
        let order = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();

        let ready = fx.lifecycle.mark_ready_for_pickup("bob", order.id).unwrap();
        assert_eq!(ready.status, OrderStatus::ReadyForPickup);
        match fx.users.get("bob").unwrap().role {
            Role::Restaurant {
                accepted_orders,
                revenue,
                ..
            } => {
                assert_eq!(accepted_orders, vec![order.id]);
                assert_eq!(revenue, 5.0);
            }
            other => panic!("unexpected {other:?}"),
        }

        let picked = fx.lifecycle.pick_up("carl", order.id).unwrap();
        assert_eq!(picked.courier.as_deref(), Some("carl"));

        let delivered = fx.lifecycle.mark_delivered("carl").unwrap();
        assert_eq!(delivered.status, OrderStatus::Delivered);
        match fx.users.get("carl").unwrap().role {
            Role::Courier {
                income,
                active_delivery,
            } => {
                assert_eq!(income, 5.0);
                assert!(active_delivery.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(
            fx.lifecycle.orders().partitions_of(order.id).unwrap(),
            vec![Partition::Customer("alice".into())]
        );
    }

    #[tokio::test]
    async fn test_mark_ready_checks_owner_and_status() {
        let fx = fixture();
        let order = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();
        assert_eq!(
            fx.lifecycle.mark_ready_for_pickup("eve", order.id).unwrap_err().code,
            ErrorCode::NotOrderOwner
        );
        fx.lifecycle.mark_ready_for_pickup("bob", order.id).unwrap();
        assert_eq!(
            fx.lifecycle.mark_ready_for_pickup("bob", order.id).unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );
        assert_eq!(
            fx.lifecycle.mark_ready_for_pickup("bob", 999).unwrap_err().code,
            ErrorCode::OrderNotFound
        );
    }

    #[tokio::test]
    async fn test_pick_up_rejects_pending_and_busy() {
        let fx = fixture();
        let first = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();
        let second = fx.lifecycle.create("alice", cart(&[("B", 1)])).await.unwrap();
        assert_eq!(
            fx.lifecycle.pick_up("carl", first.id).unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );

        fx.lifecycle.mark_ready_for_pickup("bob", first.id).unwrap();
        fx.lifecycle.mark_ready_for_pickup("bob", second.id).unwrap();
        fx.lifecycle.pick_up("carl", first.id).unwrap();
        assert_eq!(
            fx.lifecycle.pick_up("carl", second.id).unwrap_err().code,
            ErrorCode::CourierBusy
        );
        // taken by carl already
        assert_eq!(
            fx.lifecycle.pick_up("dave", first.id).unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );

        fx.lifecycle.mark_delivered("carl").unwrap();
        fx.lifecycle.pick_up("carl", second.id).unwrap();
    }

    #[tokio::test]
    async fn test_mark_delivered_without_delivery() {
        let fx = fixture();
        assert_eq!(
            fx.lifecycle.mark_delivered("carl").unwrap_err().code,
            ErrorCode::NoActiveDelivery
        );
        assert_eq!(
            fx.lifecycle.mark_delivered("alice").unwrap_err().code,
            ErrorCode::PermissionDenied
        );
    }

    #[tokio::test]
    async fn test_cancel() {
        let fx = fixture();
        let order = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();
        let cancelled = fx.lifecycle.cancel(order.id, "test").unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert_eq!(
            fx.lifecycle.orders().partitions_of(order.id).unwrap(),
            vec![Partition::Customer("alice".into())]
        );
        assert_eq!(
            fx.lifecycle.cancel(order.id, "again").unwrap_err().code,
            ErrorCode::InvalidOrderStatus
        );
    }

    /// Deletes a restaurant while checkout waits on payment
    #[derive(Debug)]
    struct DeleteDuringPayment {
        users: UserRegistry,
        restaurant: &'static str,
    }

    #[async_trait::async_trait]
    impl PaymentAuthenticator for DeleteDuringPayment {
        async fn authenticate(&self, _card: &PaymentCard) -> bool {
            self.users.delete(self.restaurant).unwrap();
            true
        }
    }

    #[tokio::test]
    async fn test_create_fails_when_restaurant_deleted_mid_checkout() {
        let fx = fixture();
        let lifecycle = OrderLifecycle::new(
            fx.users.clone(),
            fx.lifecycle.orders().clone(),
            fx.sessions.clone(),
            fx.geo.clone(),
            Arc::new(DeleteDuringPayment {
                users: fx.users.clone(),
                restaurant: "bob",
            }),
            LifecycleConfig::default(),
        );

        let err = lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::RestaurantNotFound);
        assert!(
            fx.lifecycle
                .orders()
                .list_by_partition(&Partition::Restaurant("bob".into()))
                .unwrap()
                .is_empty()
        );
        assert!(
            fx.lifecycle
                .orders()
                .list_by_partition(&Partition::Customer("alice".into()))
                .unwrap()
                .is_empty()
        );
        match fx.users.get("alice").unwrap().role {
            Role::Customer { total_spent, .. } => assert_eq!(total_spent, 0.0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_restaurant_with_pending_orders_not_deleted() {
        let fx = fixture();
        let order = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();
        assert_eq!(fx.users.delete("bob").unwrap_err().code, ErrorCode::AccountInUse);
        assert!(fx.users.exists("bob").unwrap());

        // once nothing is pending on the restaurant side it can go
        fx.lifecycle.mark_ready_for_pickup("bob", order.id).unwrap();
        fx.users.delete("bob").unwrap();
        assert!(!fx.users.exists("bob").unwrap());
    }

    #[tokio::test]
    async fn test_restaurant_location_cached_on_order() {
        let fx = fixture();
        let order = fx.lifecycle.create("alice", cart(&[("A", 1)])).await.unwrap();
        assert_eq!(order.pickup_location, Some(fx.origin));
        assert_eq!(order.dropoff_location, fx.geo.resolve("alice st").await);
    }
}

//! End-to-end order lifecycle over the line protocol

mod common;

use common::{Harness, card, signup};
use shared::error::ErrorCode;
use shared::message::{
    CartLine, DeliverySearch, OrderRef, PlaceOrderPayload, Request, RestaurantQuery, RestaurantRef,
};
use shared::models::{
    DeliveryOffer, Order, OrderStatus, Partition, RestaurantSummary, RoleKind, RoleProfile,
    UserProfile,
};

fn place(restaurant: &str, items: &[(&str, u32)]) -> Request {
    Request::PlaceOrder(PlaceOrderPayload {
        restaurant: restaurant.into(),
        items: items
            .iter()
            .map(|(name, quantity)| CartLine {
                name: name.to_string(),
                quantity: *quantity,
            })
            .collect(),
        note: "ring twice".into(),
        delivery_address: None,
        payment: Some(card()),
    })
}

fn partitions_holding(h: &Harness, order_id: u64) -> Vec<Partition> {
    let mut found: Vec<Partition> = [
        Partition::Restaurant("bob".into()),
        Partition::Customer("alice".into()),
        Partition::ReadyForPickup,
        Partition::Courier("carl".into()),
    ]
    .into_iter()
    .filter(|p| {
        h.state
            .orders
            .list_by_partition(p)
            .unwrap()
            .iter()
            .any(|o| o.id == order_id)
    })
    .collect();
    found.sort();
    found
}

#[tokio::test]
async fn test_alice_bob_carl_scenario() {
    let h = Harness::new();
    let bob = h.bob().await;
    let alice = h
        .login_as(signup("alice", RoleKind::Customer, "alice st"), "alice")
        .await;
    let carl = h
        .login_as(signup("carl", RoleKind::Courier, "carl st"), "carl")
        .await;

    // alice sees bob online
    let listed: Vec<RestaurantSummary> = alice
        .ok(Request::GetRestaurants(RestaurantQuery::default()))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].username, "bob");
    assert!((listed[0].distance_km.unwrap() - 3.0).abs() < 0.01);

    // 2×A + 1×B = 13.00
    let order: Order = alice
        .ok(place("bob", &[("A", 2), ("B", 1)]))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(order.total, 13.0);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(
        partitions_holding(&h, order.id),
        vec![
            Partition::Restaurant("bob".into()),
            Partition::Customer("alice".into())
        ]
    );

    // bob was notified
    let notices: Vec<serde_json::Value> = bob
        .ok(Request::GetNotifications)
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["order_id"], order.id);

    bob.ok(Request::MarkReady(OrderRef { order_id: order.id })).await;
    assert_eq!(
        partitions_holding(&h, order.id),
        vec![Partition::Customer("alice".into()), Partition::ReadyForPickup]
    );

    // carl is 1 km from bob's kitchen
    let offers: Vec<DeliveryOffer> = carl
        .ok(Request::FindDeliveries(DeliverySearch::default()))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].order.id, order.id);
    assert!(offers[0].distance_km <= 5.0);

    carl.ok(Request::PickUp(OrderRef { order_id: order.id })).await;
    assert_eq!(
        partitions_holding(&h, order.id),
        vec![
            Partition::Customer("alice".into()),
            Partition::Courier("carl".into())
        ]
    );

    let income_before = courier_income(&carl).await;
    let delivered: Order = carl
        .ok(Request::MarkDelivered)
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(delivered.status, OrderStatus::Delivered);
    assert_eq!(courier_income(&carl).await - income_before, 5.0);

    assert_eq!(
        partitions_holding(&h, order.id),
        vec![Partition::Customer("alice".into())]
    );
    let history: Vec<Order> = alice.ok(Request::GetOrders).await.data_as().unwrap().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, OrderStatus::Delivered);
}

async fn courier_income(client: &common::TestClient) -> f64 {
    let profile: UserProfile = client
        .ok(Request::GetProfile)
        .await
        .data_as()
        .unwrap()
        .unwrap();
    match profile.role {
        RoleProfile::Courier { income, .. } => income,
        other => panic!("not a courier: {other:?}"),
    }
}

#[tokio::test]
async fn test_busy_courier_rejected_until_delivered() {
    let h = Harness::new();
    let bob = h.bob().await;
    let alice = h
        .login_as(signup("alice", RoleKind::Customer, "alice st"), "alice")
        .await;
    let carl = h
        .login_as(signup("carl", RoleKind::Courier, "carl st"), "carl")
        .await;

    let mut ids = Vec::new();
    for _ in 0..3 {
        let order: Order = alice
            .ok(place("bob", &[("A", 1)]))
            .await
            .data_as()
            .unwrap()
            .unwrap();
        bob.ok(Request::MarkReady(OrderRef { order_id: order.id })).await;
        ids.push(order.id);
    }

    carl.ok(Request::PickUp(OrderRef { order_id: ids[0] })).await;
    let busy = carl.call(Request::PickUp(OrderRef { order_id: ids[1] })).await;
    assert_eq!(busy.code, Some(ErrorCode::CourierBusy));

    carl.ok(Request::MarkDelivered).await;
    carl.ok(Request::PickUp(OrderRef { order_id: ids[1] })).await;

    // someone else's pickup is gone from the ready list
    let taken = carl.call(Request::PickUp(OrderRef { order_id: ids[0] })).await;
    assert!(!taken.success);
}

#[tokio::test]
async fn test_offline_restaurant_rejects_orders() {
    let h = Harness::new();
    let bob = h.bob().await;
    let alice = h
        .login_as(signup("alice", RoleKind::Customer, "alice st"), "alice")
        .await;

    bob.ok(Request::Logout).await;
    let resp = alice.call(place("bob", &[("A", 1)])).await;
    assert_eq!(resp.code, Some(ErrorCode::RestaurantOffline));

    let listed: Vec<RestaurantSummary> = alice
        .ok(Request::GetRestaurants(RestaurantQuery::default()))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_disconnect_takes_restaurant_offline() {
    let h = Harness::new();
    let bob = h.bob().await;
    assert!(h.state.sessions.is_online("bob"));

    bob.close().await;
    for _ in 0..50 {
        if !h.state.sessions.is_online("bob") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert!(!h.state.sessions.is_online("bob"));
}

#[tokio::test]
async fn test_out_of_service_area() {
    let h = Harness::new();
    let _bob = h.bob().await;
    let far = h
        .login_as(signup("zoe", RoleKind::Customer, "far away"), "zoe")
        .await;
    let resp = far.call(place("bob", &[("A", 1)])).await;
    assert_eq!(resp.code, Some(ErrorCode::OutOfServiceArea));
    assert!(
        h.state
            .orders
            .list_by_partition(&Partition::Customer("zoe".into()))
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_menu_changes_do_not_touch_placed_orders() {
    let h = Harness::new();
    let bob = h.bob().await;
    let alice = h
        .login_as(signup("alice", RoleKind::Customer, "alice st"), "alice")
        .await;
    let order: Order = alice
        .ok(place("bob", &[("A", 1)]))
        .await
        .data_as()
        .unwrap()
        .unwrap();

    bob.ok(Request::UpdateMenuItem(shared::models::MenuItemUpdate {
        name: "A".into(),
        price: Some(9.0),
        description: None,
        photo: None,
        available: None,
    }))
    .await;

    let stored: Order = alice
        .ok(Request::GetOrder(OrderRef { order_id: order.id }))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, 5.0);

    let menu: serde_json::Value = alice
        .ok(Request::GetMenu(RestaurantRef {
            restaurant: "bob".into(),
        }))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(menu["items"][0]["price"], 9.0);
}

#[tokio::test]
async fn test_admin_cancel_and_visibility() {
    let h = Harness::new();
    let _bob = h.bob().await;
    let alice = h
        .login_as(signup("alice", RoleKind::Customer, "alice st"), "alice")
        .await;
    let eve = h
        .login_as(signup("eve", RoleKind::Customer, "alice st"), "eve")
        .await;
    let order: Order = alice
        .ok(place("bob", &[("B", 2)]))
        .await
        .data_as()
        .unwrap()
        .unwrap();

    let peek = eve.call(Request::GetOrder(OrderRef { order_id: order.id })).await;
    assert_eq!(peek.code, Some(ErrorCode::NotOrderOwner));

    let denied = alice
        .call(Request::CancelOrder(shared::message::CancelOrderPayload {
            order_id: order.id,
            reason: None,
        }))
        .await;
    assert_eq!(denied.code, Some(ErrorCode::PermissionDenied));

    let root = h.connect();
    root.ok(Request::login("root", "rootpw")).await;
    let cancelled: Order = root
        .ok(Request::CancelOrder(shared::message::CancelOrderPayload {
            order_id: order.id,
            reason: Some("kitchen fire".into()),
        }))
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::Cancelled);
    assert_eq!(
        partitions_holding(&h, order.id),
        vec![Partition::Customer("alice".into())]
    );
}

#[tokio::test]
async fn test_restaurant_relogin_keeps_unread_notices() {
    let h = Harness::new();
    let bob = h.bob().await;
    let alice = h
        .login_as(signup("alice", RoleKind::Customer, "alice st"), "alice")
        .await;
    let order: Order = alice
        .ok(place("bob", &[("A", 1)]))
        .await
        .data_as()
        .unwrap()
        .unwrap();

    bob.ok(Request::login("bob", "secret")).await;
    assert!(h.state.sessions.is_online("bob"));

    let notices: Vec<serde_json::Value> = bob
        .ok(Request::GetNotifications)
        .await
        .data_as()
        .unwrap()
        .unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["order_id"], order.id);
}

//! Order handlers: checkout, order views, restaurant notices, mark ready

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{OrderRef, PlaceOrderPayload, RequestKind, Response};
use shared::models::{Order, Partition, RoleKind, User};

use super::{current_user, require_role};
use crate::core::ServerState;
use crate::message::dispatcher::Session;
use crate::orders::NewOrder;
use crate::utils::validation::{MAX_ADDRESS_LEN, validate_required_text};

pub async fn place_order(
    state: &ServerState,
    session: &Session,
    payload: PlaceOrderPayload,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Customer)?;
    if let Some(address) = &payload.delivery_address {
        validate_required_text(address, "delivery_address", MAX_ADDRESS_LEN)?;
    }

    let order = state
        .lifecycle
        .create(
            &user.username,
            NewOrder {
                restaurant: payload.restaurant,
                items: payload.items,
                note: payload.note,
                delivery_address: payload.delivery_address,
                payment: payload.payment,
            },
        )
        .await?;

    Ok(Response::ok_with(
        RequestKind::PlaceOrder.as_str(),
        format!("Order {} placed", order.id),
        &order,
    ))
}

/// The caller's own partition
///
/// | role | orders |
/// |------|--------|
/// | customer | full history |
/// | restaurant | pending, not yet ready |
/// | courier | the active delivery |
pub fn get_orders(state: &ServerState, session: &Session) -> AppResult<Response> {
    let user = current_user(state, session)?;
    let partition = match user.kind() {
        RoleKind::Customer => Partition::Customer(user.username.clone()),
        RoleKind::Restaurant => Partition::Restaurant(user.username.clone()),
        RoleKind::Courier => Partition::Courier(user.username.clone()),
        RoleKind::Admin => {
            return Err(AppError::permission_denied("Admins look up orders by id"));
        }
    };

    let orders = state.orders.list_by_partition(&partition)?;
    Ok(Response::ok_with(
        RequestKind::GetOrders.as_str(),
        format!("{} orders", orders.len()),
        &orders,
    ))
}

pub fn get_order(state: &ServerState, session: &Session, target: OrderRef) -> AppResult<Response> {
    let user = current_user(state, session)?;
    let order = state.orders.get(target.order_id)?;
    if !can_view(state, &user, &order)? {
        return Err(AppError::with_message(
            ErrorCode::NotOrderOwner,
            format!("Order {} belongs to another account", order.id),
        ));
    }
    Ok(Response::ok_with(
        RequestKind::GetOrder.as_str(),
        "Order",
        &order,
    ))
}

/// New-order notices queued since the last call, oldest first
pub fn get_notifications(state: &ServerState, session: &Session) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Restaurant)?;

    let notices = state.sessions.drain_notifications(&user.username);
    Ok(Response::ok_with(
        RequestKind::GetNotifications.as_str(),
        format!("{} new orders", notices.len()),
        &notices,
    ))
}

pub fn mark_ready(state: &ServerState, session: &Session, target: OrderRef) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Restaurant)?;

    let order = state
        .lifecycle
        .mark_ready_for_pickup(&user.username, target.order_id)?;
    Ok(Response::ok_with(
        RequestKind::MarkReady.as_str(),
        format!("Order {} is ready for pickup", order.id),
        &order,
    ))
}

/// Parties of the order, admins, and couriers while it waits for pickup
fn can_view(state: &ServerState, user: &User, order: &Order) -> AppResult<bool> {
    if user.is_admin()
        || order.customer == user.username
        || order.restaurant == user.username
        || order.courier.as_deref() == Some(user.username.as_str())
    {
        return Ok(true);
    }
    if user.is_courier() {
        return state.orders.contains(&Partition::ReadyForPickup, order.id);
    }
    Ok(false)
}

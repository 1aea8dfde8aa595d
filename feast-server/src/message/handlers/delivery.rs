//! Courier handlers

use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{DeliverySearch, OrderRef, RequestKind, Response};
use shared::models::RoleKind;

use super::{current_user, require_role};
use crate::core::ServerState;
use crate::message::dispatcher::Session;

/// Ready orders around the courier
///
/// Location defaults to the courier's registered address, radius to the
/// configured search radius.
pub async fn find_deliveries(
    state: &ServerState,
    session: &Session,
    search: DeliverySearch,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Courier)?;

    let location = search.location.or(user.location).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::AddressUnresolvable,
            "No courier location given and none on file",
        )
    })?;
    let max_km = search
        .max_km
        .unwrap_or(state.config.default_search_radius_km);

    let offers = state.matcher.find_available(location, max_km).await?;
    Ok(Response::ok_with(
        RequestKind::FindDeliveries.as_str(),
        format!("{} orders within {max_km} km", offers.len()),
        &offers,
    ))
}

pub fn pick_up(state: &ServerState, session: &Session, target: OrderRef) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Courier)?;

    let order = state.lifecycle.pick_up(&user.username, target.order_id)?;
    Ok(Response::ok_with(
        RequestKind::PickUp.as_str(),
        format!("Order {} picked up", order.id),
        &order,
    ))
}

pub fn mark_delivered(state: &ServerState, session: &Session) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Courier)?;

    let order = state.lifecycle.mark_delivered(&user.username)?;
    Ok(Response::ok_with(
        RequestKind::MarkDelivered.as_str(),
        format!("Order {} delivered", order.id),
        &order,
    ))
}

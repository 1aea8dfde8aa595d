//! Admin handlers

use shared::error::{AppError, AppResult};
use shared::message::{CancelOrderPayload, RequestKind, Response, UserRef};
use shared::models::{RoleKind, UserProfile};

use super::{current_user, remove_account, require_role};
use crate::core::ServerState;
use crate::message::dispatcher::Session;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

const DEFAULT_CANCEL_REASON: &str = "cancelled by admin";

pub fn cancel_order(
    state: &ServerState,
    session: &Session,
    payload: CancelOrderPayload,
) -> AppResult<Response> {
    let admin = current_user(state, session)?;
    require_role(&admin, RoleKind::Admin)?;
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let reason = payload
        .reason
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_CANCEL_REASON);
    let order = state.lifecycle.cancel(payload.order_id, reason)?;

    tracing::info!(admin = %admin.username, order_id = order.id, reason, "order cancelled");
    Ok(Response::ok_with(
        RequestKind::CancelOrder.as_str(),
        format!("Order {} cancelled", order.id),
        &order,
    ))
}

pub fn list_users(state: &ServerState, session: &Session) -> AppResult<Response> {
    let admin = current_user(state, session)?;
    require_role(&admin, RoleKind::Admin)?;

    let users: Vec<UserProfile> = state.users.list()?.iter().map(|u| u.profile()).collect();
    Ok(Response::ok_with(
        RequestKind::ListUsers.as_str(),
        format!("{} accounts", users.len()),
        &users,
    ))
}

pub fn delete_user(state: &ServerState, session: &Session, target: UserRef) -> AppResult<Response> {
    let admin = current_user(state, session)?;
    require_role(&admin, RoleKind::Admin)?;
    if target.username == admin.username {
        return Err(AppError::permission_denied(
            "Use delete_account to remove your own account",
        ));
    }

    let removed = remove_account(state, &target.username)?;
    tracing::info!(admin = %admin.username, username = %removed.username, "account removed by admin");
    Ok(Response::ok(
        RequestKind::DeleteUser.as_str(),
        format!("Account {} deleted", removed.username),
    ))
}

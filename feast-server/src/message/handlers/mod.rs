//! Request handlers, grouped by the account role that mostly uses them
//!
//! Each handler receives the shared [`ServerState`] and the caller's
//! [`Session`], and returns the success response or an [`AppError`] that
//! the dispatcher turns into a failure response.

pub mod account;
pub mod admin;
pub mod catalog;
pub mod delivery;
pub mod orders;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{GeoPoint, RoleKind, User};

use super::dispatcher::Session;
use crate::core::ServerState;

/// Fresh copy of the logged-in account
///
/// An account deleted by an admin mid-session reads as logged out.
pub(crate) fn current_user(state: &ServerState, session: &Session) -> AppResult<User> {
    let username = session.username().ok_or_else(AppError::not_authenticated)?;
    state
        .users
        .find(username)?
        .ok_or_else(AppError::not_authenticated)
}

pub(crate) fn require_role(user: &User, kind: RoleKind) -> AppResult<()> {
    if user.kind() == kind {
        Ok(())
    } else {
        Err(AppError::permission_denied(format!(
            "Only {kind} accounts can do this"
        )))
    }
}

pub(crate) async fn locate_address(state: &ServerState, address: &str) -> AppResult<GeoPoint> {
    state.geo.resolve(address).await.ok_or_else(|| {
        AppError::with_message(
            ErrorCode::AddressUnresolvable,
            format!("Address could not be located: {address}"),
        )
    })
}

/// Delete an account and release what it holds
///
/// A restaurant with pending orders and a courier on a delivery are kept.
pub(crate) fn remove_account(state: &ServerState, username: &str) -> AppResult<User> {
    let removed = state.users.delete(username)?;
    if removed.is_restaurant() {
        state.sessions.evict(username);
    }
    Ok(removed)
}

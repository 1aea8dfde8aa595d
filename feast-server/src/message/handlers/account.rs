//! Account handlers: signup, login/logout, profile, payment card

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{
    DeleteAccountPayload, LoginPayload, ProfileUpdate, RequestKind, Response, SignupPayload,
};
use shared::models::{PaymentCard, Role, RoleKind, User};

use super::{current_user, locate_address, remove_account, require_role};
use crate::core::ServerState;
use crate::message::dispatcher::Session;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_email, validate_password,
    validate_required_text, validate_username,
};

pub async fn signup(state: &ServerState, payload: SignupPayload) -> AppResult<Response> {
    validate_username(&payload.username)?;
    validate_password(&payload.password)?;
    validate_required_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    validate_required_text(&payload.phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_email(&payload.email)?;

    let cuisine = match payload.role {
        RoleKind::Admin => {
            return Err(AppError::permission_denied(
                "Admin accounts can not be created by signup",
            ));
        }
        RoleKind::Restaurant => {
            let cuisine = payload.cuisine.as_deref().unwrap_or_default().trim();
            validate_required_text(cuisine, "cuisine", MAX_NAME_LEN)?;
            Some(cuisine.to_string())
        }
        RoleKind::Customer | RoleKind::Courier => None,
    };

    // fail fast before hashing
    if state.users.exists(&payload.username)? {
        return Err(AppError::with_message(
            ErrorCode::UsernameTaken,
            format!("Username already exists: {}", payload.username),
        ));
    }
    let location = locate_address(state, &payload.address).await?;

    let user = User {
        username: payload.username,
        password_hash: state.users.hash_password(&payload.password)?,
        address: payload.address,
        phone: payload.phone,
        email: payload.email,
        location: Some(location),
        created_at: now_millis(),
        role: Role::new_for(payload.role, cuisine),
    };
    state.users.create(user.clone())?;

    Ok(Response::ok_with(
        RequestKind::Signup.as_str(),
        "Account created",
        &user.profile(),
    ))
}

pub fn login(state: &ServerState, session: &mut Session, payload: LoginPayload) -> AppResult<Response> {
    let user = state.users.authenticate(&payload.username, &payload.password)?;

    // re-login on the same connection replaces the previous identity; the
    // same restaurant logging in again keeps its session and queued notices
    if let Some(previous) = session.unbind()
        && previous != user.username
    {
        state.sessions.on_logout(&previous, session.connection);
    }
    session.bind(&user.username);
    if user.is_restaurant() {
        state.sessions.on_login(&user.username, session.connection);
    }

    tracing::info!(
        username = %user.username,
        role = %user.kind(),
        connection = session.connection,
        "login"
    );
    Ok(Response::ok_with(
        RequestKind::Login.as_str(),
        "Login successful",
        &user.profile(),
    ))
}

pub fn logout(state: &ServerState, session: &mut Session) -> AppResult<Response> {
    if let Some(username) = session.unbind() {
        state.sessions.on_logout(&username, session.connection);
        tracing::info!(username = %username, connection = session.connection, "logout");
    }
    Ok(Response::ok(RequestKind::Logout.as_str(), "Logged out"))
}

pub fn get_profile(state: &ServerState, session: &Session) -> AppResult<Response> {
    let user = current_user(state, session)?;
    Ok(Response::ok_with(
        RequestKind::GetProfile.as_str(),
        "Profile",
        &user.profile(),
    ))
}

pub async fn update_profile(
    state: &ServerState,
    session: &Session,
    update: ProfileUpdate,
) -> AppResult<Response> {
    let user = current_user(state, session)?;

    if let Some(phone) = &update.phone {
        validate_required_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(email) = &update.email {
        validate_email(email)?;
    }
    if (update.cuisine.is_some() || update.has_image.is_some()) && !user.is_restaurant() {
        return Err(AppError::permission_denied(
            "Only restaurant accounts have a cuisine or image",
        ));
    }
    if let Some(cuisine) = &update.cuisine {
        validate_required_text(cuisine, "cuisine", MAX_NAME_LEN)?;
    }
    let location = match &update.address {
        Some(address) => {
            validate_required_text(address, "address", MAX_ADDRESS_LEN)?;
            Some(locate_address(state, address).await?)
        }
        None => None,
    };
    let password_hash = match &update.password {
        Some(password) => {
            validate_password(password)?;
            Some(state.users.hash_password(password)?)
        }
        None => None,
    };

    let updated = state.users.modify(&user.username, |u| {
        if let Some(address) = update.address {
            u.address = address;
            u.location = location;
        }
        if let Some(phone) = update.phone {
            u.phone = phone;
        }
        if let Some(email) = update.email {
            u.email = email;
        }
        if let Some(hash) = password_hash {
            u.password_hash = hash;
        }
        if let Role::Restaurant {
            cuisine, has_image, ..
        } = &mut u.role
        {
            if let Some(new_cuisine) = update.cuisine {
                *cuisine = new_cuisine.trim().to_string();
            }
            if let Some(flag) = update.has_image {
                *has_image = flag;
            }
        }
        Ok(())
    })?;

    Ok(Response::ok_with(
        RequestKind::UpdateProfile.as_str(),
        "Profile updated",
        &updated.profile(),
    ))
}

pub fn delete_account(
    state: &ServerState,
    session: &mut Session,
    payload: DeleteAccountPayload,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    if !state.users.verify_password(&user, &payload.password) {
        return Err(AppError::invalid_credentials());
    }

    remove_account(state, &user.username)?;
    if let Some(username) = session.unbind() {
        state.sessions.on_logout(&username, session.connection);
    }
    Ok(Response::ok(
        RequestKind::DeleteAccount.as_str(),
        "Account deleted",
    ))
}

pub async fn save_payment(
    state: &ServerState,
    session: &Session,
    card: PaymentCard,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Customer)?;

    if !state.payment.authenticate(&card).await {
        return Err(AppError::with_message(
            ErrorCode::PaymentRejected,
            "Card was rejected",
        ));
    }

    let masked = card.masked();
    state.users.modify(&user.username, |u| {
        if let Role::Customer { payment, .. } = &mut u.role {
            *payment = Some(card);
        }
        Ok(())
    })?;

    Ok(Response::ok_with(
        RequestKind::SavePayment.as_str(),
        "Payment method saved",
        &json!({ "card": masked }),
    ))
}

//! Catalog handlers: restaurant listing and menu management

use std::cmp::Ordering;

use serde_json::json;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::message::{MenuItemRef, RequestKind, Response, RestaurantQuery, RestaurantRef};
use shared::models::{
    MenuItem, MenuItemCreate, MenuItemUpdate, RestaurantSummary, Role, RoleKind, User,
};

use super::{current_user, require_role};
use crate::core::ServerState;
use crate::message::dispatcher::Session;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_price,
    validate_required_text,
};

/// Online restaurants, nearest to the caller first
pub fn get_restaurants(
    state: &ServerState,
    session: &Session,
    query: RestaurantQuery,
) -> AppResult<Response> {
    let caller = current_user(state, session)?;
    let cuisine_filter = query
        .cuisine
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let mut restaurants = Vec::new();
    for name in state.sessions.list_online() {
        let Some(user) = state.users.find(&name)? else {
            continue;
        };
        let Role::Restaurant {
            cuisine, has_image, ..
        } = &user.role
        else {
            continue;
        };
        if let Some(wanted) = cuisine_filter
            && !cuisine.eq_ignore_ascii_case(wanted)
        {
            continue;
        }
        let distance_km = match (caller.location, user.location) {
            (Some(from), Some(to)) => Some(state.geo.distance_km(&from, &to)),
            _ => None,
        };
        restaurants.push(RestaurantSummary {
            username: user.username.clone(),
            cuisine: cuisine.clone(),
            address: user.address.clone(),
            phone: user.phone.clone(),
            has_image: *has_image,
            distance_km,
        });
    }

    restaurants.sort_by(|a, b| {
        match (a.distance_km, b.distance_km) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
        .then_with(|| a.username.cmp(&b.username))
    });

    Ok(Response::ok_with(
        RequestKind::GetRestaurants.as_str(),
        format!("{} restaurants online", restaurants.len()),
        &restaurants,
    ))
}

/// A restaurant's menu; others only see available items
pub fn get_menu(state: &ServerState, session: &Session, target: RestaurantRef) -> AppResult<Response> {
    let caller = current_user(state, session)?;
    let restaurant = find_restaurant(state, &target.restaurant)?;
    let is_owner = caller.username == restaurant.username;

    let items: Vec<&MenuItem> = restaurant
        .menu()
        .unwrap_or_default()
        .iter()
        .filter(|item| is_owner || item.available)
        .collect();

    Ok(Response::ok_with(
        RequestKind::GetMenu.as_str(),
        "Menu",
        &json!({
            "restaurant": restaurant.username,
            "online": state.sessions.is_online(&restaurant.username),
            "items": items,
        }),
    ))
}

pub fn add_menu_item(
    state: &ServerState,
    session: &Session,
    item: MenuItemCreate,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Restaurant)?;

    validate_required_text(&item.name, "name", MAX_NAME_LEN)?;
    validate_price(item.price)?;
    if item.description.len() > MAX_NOTE_LEN {
        return Err(AppError::validation(format!(
            "description is too long (max {MAX_NOTE_LEN})"
        )));
    }
    validate_optional_text(&item.photo, "photo", MAX_URL_LEN)?;

    let mut item: MenuItem = item.into();
    item.name = item.name.trim().to_string();
    let added = item.clone();

    state.users.modify(&user.username, |u| {
        let menu = menu_mut(u)?;
        if menu.iter().any(|m| m.name.eq_ignore_ascii_case(&item.name)) {
            return Err(AppError::with_message(
                ErrorCode::MenuItemExists,
                format!("Menu item already exists: {}", item.name),
            ));
        }
        menu.push(item);
        Ok(())
    })?;

    tracing::info!(restaurant = %user.username, item = %added.name, "menu item added");
    Ok(Response::ok_with(
        RequestKind::AddMenuItem.as_str(),
        "Menu item added",
        &added,
    ))
}

/// Edits apply to future orders only; placed orders keep their snapshot
pub fn update_menu_item(
    state: &ServerState,
    session: &Session,
    update: MenuItemUpdate,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Restaurant)?;

    if let Some(price) = update.price {
        validate_price(price)?;
    }
    validate_optional_text(&update.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&update.photo, "photo", MAX_URL_LEN)?;

    let mut updated = None;
    state.users.modify(&user.username, |u| {
        let item = menu_mut(u)?
            .iter_mut()
            .find(|m| m.name.eq_ignore_ascii_case(&update.name))
            .ok_or_else(|| menu_item_not_found(&update.name))?;
        item.apply(&update);
        updated = Some(item.clone());
        Ok(())
    })?;

    let updated = updated.ok_or_else(|| menu_item_not_found(&update.name))?;
    Ok(Response::ok_with(
        RequestKind::UpdateMenuItem.as_str(),
        "Menu item updated",
        &updated,
    ))
}

pub fn remove_menu_item(
    state: &ServerState,
    session: &Session,
    target: MenuItemRef,
) -> AppResult<Response> {
    let user = current_user(state, session)?;
    require_role(&user, RoleKind::Restaurant)?;

    state.users.modify(&user.username, |u| {
        let menu = menu_mut(u)?;
        let index = menu
            .iter()
            .position(|m| m.name.eq_ignore_ascii_case(&target.name))
            .ok_or_else(|| menu_item_not_found(&target.name))?;
        menu.remove(index);
        Ok(())
    })?;

    tracing::info!(restaurant = %user.username, item = %target.name, "menu item removed");
    Ok(Response::ok(
        RequestKind::RemoveMenuItem.as_str(),
        "Menu item removed",
    ))
}

// ========== Helpers ==========

fn find_restaurant(state: &ServerState, name: &str) -> AppResult<User> {
    match state.users.find(name)? {
        Some(user) if user.is_restaurant() => Ok(user),
        _ => Err(AppError::with_message(
            ErrorCode::RestaurantNotFound,
            format!("Restaurant not found: {name}"),
        )),
    }
}

fn menu_mut(user: &mut User) -> AppResult<&mut Vec<MenuItem>> {
    match &mut user.role {
        Role::Restaurant { menu, .. } => Ok(menu),
        _ => Err(AppError::permission_denied("Only restaurant accounts have a menu")),
    }
}

fn menu_item_not_found(name: &str) -> AppError {
    AppError::with_message(
        ErrorCode::MenuItemNotFound,
        format!("Menu item not found: {name}"),
    )
}

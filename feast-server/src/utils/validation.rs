//! Input validation helpers
//!
//! Centralized text length constants and validation functions used by the
//! request handlers before anything touches storage.

use validator::ValidateEmail;

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Usernames, menu item names, cuisine tags
pub const MAX_NAME_LEN: usize = 64;

/// Order notes, menu descriptions, cancel reasons
pub const MAX_NOTE_LEN: usize = 500;

/// Phone numbers
pub const MAX_SHORT_TEXT_LEN: usize = 32;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 4;

/// Photo references
pub const MAX_URL_LEN: usize = 2048;

/// Street addresses
pub const MAX_ADDRESS_LEN: usize = 500;

/// Per-line quantity cap
pub const MAX_QUANTITY: u32 = 999;

/// Menu price cap
pub const MAX_PRICE: f64 = 100_000.0;

// ── Validation helpers ──────────────────────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Usernames double as partition keys, so `:` and whitespace are rejected.
pub fn validate_username(username: &str) -> Result<(), AppError> {
    validate_required_text(username, "username", MAX_NAME_LEN)?;
    if username
        .chars()
        .any(|c| c == ':' || c.is_whitespace() || c.is_control())
    {
        return Err(AppError::validation(
            "username must not contain ':' or whitespace",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), AppError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    if password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "password is too long (max {MAX_PASSWORD_LEN})"
        )));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), AppError> {
    validate_required_text(email, "email", MAX_EMAIL_LEN)?;
    if !email.validate_email() {
        return Err(AppError::validation(format!("invalid email: {email}")));
    }
    Ok(())
}

/// Price must be finite, non-negative and under the cap.
pub fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "price must be a non-negative number, got {price}"
        )));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "price exceeds maximum allowed ({MAX_PRICE}), got {price}"
        )));
    }
    Ok(())
}

pub fn validate_quantity(quantity: u32) -> Result<(), AppError> {
    if quantity == 0 || quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity must be between 1 and {MAX_QUANTITY}, got {quantity}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("bob", "name", 10).is_ok());
        assert!(validate_required_text("   ", "name", 10).is_err());
        assert!(validate_required_text("abcdefghijk", "name", 10).is_err());
    }

    #[test]
    fn test_username_rejects_separator() {
        assert!(validate_username("alice").is_ok());
        let err = validate_username("ali:ce").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
        assert!(validate_username("ali ce").is_err());
    }

    #[test]
    fn test_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
    }

    #[test]
    fn test_price_and_quantity() {
        assert!(validate_price(0.0).is_ok());
        assert!(validate_price(-1.0).is_err());
        assert!(validate_price(f64::NAN).is_err());
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
    }
}

//! Error codes shared by server and client
//!
//! Codes are serialized as `u16` so that any client (Rust or not) can branch
//! on them without parsing messages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0: Success ====================
    Success = 0,

    // ==================== 1xxx: Authentication ====================
    /// Request requires a logged-in session
    NotAuthenticated = 1001,
    /// Unknown user or wrong password (never distinguished)
    InvalidCredentials = 1002,

    // ==================== 2xxx: Not found ====================
    UserNotFound = 2001,
    RestaurantNotFound = 2002,
    MenuItemNotFound = 2003,
    OrderNotFound = 2004,

    // ==================== 3xxx: Precondition ====================
    /// Account role does not allow this operation
    PermissionDenied = 3001,
    RestaurantOffline = 3002,
    InvalidOrderStatus = 3003,
    NotOrderOwner = 3004,
    /// Courier already has an active delivery
    CourierBusy = 3005,
    NoActiveDelivery = 3006,
    OutOfServiceArea = 3007,
    MenuItemUnavailable = 3008,
    /// Account cannot be removed while it holds live state
    AccountInUse = 3009,

    // ==================== 4xxx: Validation ====================
    ValidationFailed = 4001,
    UsernameTaken = 4002,
    EmailTaken = 4003,
    MenuItemExists = 4004,
    PaymentRejected = 4005,
    AddressUnresolvable = 4006,
    EmptyOrder = 4007,

    // ==================== 5xxx: Protocol ====================
    UnsupportedRequest = 5001,
    MalformedRequest = 5002,

    // ==================== 9xxx: Persistence / system ====================
    PersistenceFailure = 9001,
    InternalError = 9901,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Stable default message for the code
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",

            ErrorCode::NotAuthenticated => "Please login first",
            ErrorCode::InvalidCredentials => "Invalid username or password",

            ErrorCode::UserNotFound => "User not found",
            ErrorCode::RestaurantNotFound => "Restaurant not found",
            ErrorCode::MenuItemNotFound => "Menu item not found",
            ErrorCode::OrderNotFound => "Order not found",

            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RestaurantOffline => "Restaurant is not accepting orders",
            ErrorCode::InvalidOrderStatus => "Order is not in the expected status",
            ErrorCode::NotOrderOwner => "Order belongs to another account",
            ErrorCode::CourierBusy => "Courier already has an active delivery",
            ErrorCode::NoActiveDelivery => "Courier has no active delivery",
            ErrorCode::OutOfServiceArea => "Delivery address is outside the service area",
            ErrorCode::MenuItemUnavailable => "Menu item is not available",
            ErrorCode::AccountInUse => "Account has work in progress",

            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::UsernameTaken => "Username already exists",
            ErrorCode::EmailTaken => "Email already registered",
            ErrorCode::MenuItemExists => "Menu item already exists",
            ErrorCode::PaymentRejected => "Payment rejected",
            ErrorCode::AddressUnresolvable => "Address could not be located",
            ErrorCode::EmptyOrder => "Order has no items",

            ErrorCode::UnsupportedRequest => "Unsupported request",
            ErrorCode::MalformedRequest => "Malformed request",

            ErrorCode::PersistenceFailure => "Storage write failed, please retry",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ErrorCode::Success),

            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),

            2001 => Ok(ErrorCode::UserNotFound),
            2002 => Ok(ErrorCode::RestaurantNotFound),
            2003 => Ok(ErrorCode::MenuItemNotFound),
            2004 => Ok(ErrorCode::OrderNotFound),

            3001 => Ok(ErrorCode::PermissionDenied),
            3002 => Ok(ErrorCode::RestaurantOffline),
            3003 => Ok(ErrorCode::InvalidOrderStatus),
            3004 => Ok(ErrorCode::NotOrderOwner),
            3005 => Ok(ErrorCode::CourierBusy),
            3006 => Ok(ErrorCode::NoActiveDelivery),
            3007 => Ok(ErrorCode::OutOfServiceArea),
            3008 => Ok(ErrorCode::MenuItemUnavailable),
            3009 => Ok(ErrorCode::AccountInUse),

            4001 => Ok(ErrorCode::ValidationFailed),
            4002 => Ok(ErrorCode::UsernameTaken),
            4003 => Ok(ErrorCode::EmailTaken),
            4004 => Ok(ErrorCode::MenuItemExists),
            4005 => Ok(ErrorCode::PaymentRejected),
            4006 => Ok(ErrorCode::AddressUnresolvable),
            4007 => Ok(ErrorCode::EmptyOrder),

            5001 => Ok(ErrorCode::UnsupportedRequest),
            5002 => Ok(ErrorCode::MalformedRequest),

            9001 => Ok(ErrorCode::PersistenceFailure),
            9901 => Ok(ErrorCode::InternalError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip_through_u16() {
        for code in [
            ErrorCode::Success,
            ErrorCode::InvalidCredentials,
            ErrorCode::OrderNotFound,
            ErrorCode::CourierBusy,
            ErrorCode::PaymentRejected,
            ErrorCode::UnsupportedRequest,
            ErrorCode::PersistenceFailure,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(1234), Err(InvalidErrorCode(1234)));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&ErrorCode::CourierBusy).unwrap();
        assert_eq!(json, "3005");
        let back: ErrorCode = serde_json::from_str("2004").unwrap();
        assert_eq!(back, ErrorCode::OrderNotFound);
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::InvalidCredentials.to_string(), "E1002");
        assert_eq!(ErrorCode::Success.to_string(), "E0000");
    }
}

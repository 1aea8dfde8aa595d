//! Response line

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult, ErrorCode};

/// Server response, one per request line
///
/// ```json
/// {"type": "place_order", "success": true, "message": "Order placed", "data": {...}}
/// {"type": "pick_up", "success": false, "message": "...", "code": 3005}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Echo of the request tag
    #[serde(rename = "type")]
    pub kind: String,
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn ok(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            success: true,
            message: message.into(),
            code: None,
            data: None,
        }
    }

    /// Success carrying a payload; a payload that cannot be encoded becomes an
    /// internal error response
    pub fn ok_with<T: Serialize>(kind: impl Into<String>, message: impl Into<String>, data: &T) -> Self {
        let kind = kind.into();
        match serde_json::to_value(data) {
            Ok(value) => Self {
                kind,
                success: true,
                message: message.into(),
                code: None,
                data: Some(value),
            },
            Err(e) => Self::failure(kind, &AppError::internal(format!("encode response: {e}"))),
        }
    }

    pub fn failure(kind: impl Into<String>, err: &AppError) -> Self {
        Self {
            kind: kind.into(),
            success: false,
            message: err.message.clone(),
            code: Some(err.code),
            data: None,
        }
    }

    /// Back to an error on the client side
    pub fn into_result(self) -> AppResult<Option<Value>> {
        if self.success {
            Ok(self.data)
        } else {
            let code = self.code.unwrap_or(ErrorCode::InternalError);
            Err(AppError::with_message(code, self.message))
        }
    }

    /// Decode the payload as `T`
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.data.clone().map(serde_json::from_value)
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category, determined by the leading digit of the error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Success (0)
    None,
    /// Bad or missing credentials (1xxx)
    Authentication,
    /// Order / user / restaurant / menu item absent (2xxx)
    NotFound,
    /// State does not allow the operation (3xxx)
    Precondition,
    /// Input rejected (4xxx)
    Validation,
    /// Request could not be decoded or routed (5xxx)
    Protocol,
    /// Store write did not complete (90xx)
    Persistence,
    /// Anything else on the server side (99xx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => Self::None,
            1000..2000 => Self::Authentication,
            2000..3000 => Self::NotFound,
            3000..4000 => Self::Precondition,
            4000..5000 => Self::Validation,
            5000..6000 => Self::Protocol,
            9000..9900 => Self::Persistence,
            _ => Self::System,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Authentication => "authentication",
            Self::NotFound => "not_found",
            Self::Precondition => "precondition",
            Self::Validation => "validation",
            Self::Protocol => "protocol",
            Self::Persistence => "persistence",
            Self::System => "system",
        }
    }

    /// Whether retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

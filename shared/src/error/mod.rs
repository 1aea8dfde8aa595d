//! Unified error system for Feast
//!
//! - [`ErrorCode`]: stable numeric codes carried on the wire
//! - [`ErrorCategory`]: classification by code range
//! - [`AppError`]: code + human readable message
//!
//! # Error Code Ranges
//!
//! | Range | Category | Example |
//! |-------|----------|---------|
//! | 1xxx | Authentication | 1002 invalid credentials |
//! | 2xxx | Not found | 2004 order not found |
//! | 3xxx | Precondition | 3005 courier busy |
//! | 4xxx | Validation | 4005 payment rejected |
//! | 5xxx | Protocol | 5001 unsupported request |
//! | 9xxx | Persistence / system | 9001 persistence failure |
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCategory, ErrorCode};
//!
//! let err = AppError::with_message(ErrorCode::OrderNotFound, "Order 42 not found");
//! assert_eq!(err.code.category(), ErrorCategory::NotFound);
//! ```

mod category;
mod codes;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult};

//! 时间工具函数
//!
//! All persisted timestamps are `i64` Unix millis (UTC).

use chrono::{Datelike, Utc};

/// Current time in Unix millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Current (year, month) in UTC, used for card expiry checks
pub fn current_year_month() -> (i32, u32) {
    let now = Utc::now();
    (now.year(), now.month())
}

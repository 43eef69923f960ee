//! Time helpers
//!
//! All timestamps in storage are `i64` Unix millis (UTC). Handlers and
//! services call [`now_millis`]; tests pass explicit values into the
//! pure lease arithmetic instead of sleeping.

/// Current time as Unix millis
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

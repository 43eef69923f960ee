//! Utility module
//!
//! # Contents
//!
//! - [`AppError`] - application error type with HTTP mapping
//! - [`AppResponse`] - API response envelope
//! - logging setup and time helpers

pub mod error;
pub mod logger;
pub mod time;

pub use error::{AppError, AppResponse, AppResult};
pub use error::{ok, ok_with_message};
pub use time::now_millis;

//! Competitive bidding: offer intake, edit leases and winner ranking

pub mod collector;
pub mod lock;
pub mod money;
pub mod ranking;

pub use collector::BidCollector;
pub use lock::{EDIT_LOCK_TIMEOUT_SECS, EditLockGuard};
pub use ranking::RankEngine;

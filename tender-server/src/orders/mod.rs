//! Order intake and lifecycle

pub mod lifecycle;
pub mod service;

pub use lifecycle::LifecycleService;
pub use service::OrderService;

//! HTTP API
//!
//! # Structure
//!
//! - [`orders`] - order intake, lifecycle, approval, per-order bidding
//! - [`offers`] - offer revision, edit leases, winner toggle
//! - [`chat`] - negotiation threads
//! - [`admin`] - destructive maintenance operations
//! - [`health`] - health check
//!
//! Routers compose in [`routes::build_router`]; [`routes::build_app`]
//! adds the middleware stack and state.

pub mod actor;
pub mod router_ext;
pub mod routes;

pub mod admin;
pub mod chat;
pub mod health;
pub mod offers;
pub mod orders;

pub use actor::Actor;
pub use router_ext::{OneshotResult, OneshotRouter};
pub use routes::{build_app, build_router};

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

//! Core module: configuration, state and server startup
//!
//! - [`Config`] - runtime configuration
//! - [`ServerState`] - shared service aggregate
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;

//! Tender Server - sourcing marketplace core
//!
//! # Architecture overview
//!
//! The server runs the competitive-sourcing workflow end to end:
//!
//! - **Orders** (`orders`): buyer request intake and the canonical
//!   status machine
//! - **Bidding** (`bidding`): per-supplier offers, advisory edit
//!   leases, winner selection and the bid board
//! - **Approval** (`approval`): atomic proposal commit
//! - **Chat** (`chat`): per-order negotiation threads and live event
//!   channels
//! - **Storage** (`store`): embedded redb database, one write
//!   transaction per operation
//! - **HTTP API** (`api`): RESTful interface over axum
//!
//! # Module structure
//!
//! ```text
//! tender-server/src/
//! ├── core/      # Configuration, state, server startup
//! ├── store/     # redb entity storage
//! ├── orders/    # Order intake and lifecycle
//! ├── bidding/   # Offer intake, edit leases, ranking
//! ├── approval/  # Atomic proposal commit
//! ├── chat/      # Negotiation threads and event channels
//! ├── api/       # HTTP routes and handlers
//! └── utils/     # Errors, logging, time
//! ```

pub mod api;
pub mod approval;
pub mod bidding;
pub mod chat;
pub mod core;
pub mod orders;
pub mod store;
pub mod utils;

// Re-export common types
pub use api::Actor;
pub use approval::ApprovalCommitter;
pub use bidding::{BidCollector, EditLockGuard, RankEngine};
pub use chat::{ChannelHub, ChatThreadManager};
pub use core::{Config, Server, ServerState};
pub use orders::{LifecycleService, OrderService};
pub use store::EntityStore;
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
  ______               __
 /_  __/__  ____  ____/ /__  _____
  / / / _ \/ __ \/ __  / _ \/ ___/
 / / /  __/ / / / /_/ /  __/ /
/_/  \___/_/ /_/\__,_/\___/_/
    "#
    );
}

/// Prepare the process environment: dotenv first, then logging from
/// the resulting configuration
pub fn setup_environment() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    utils::logger::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    Ok(())
}

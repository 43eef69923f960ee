//! Shared types for the Tender marketplace
//!
//! Common types used across the server and client crates: order and
//! offer entities, the canonical status machine, chat types, push
//! events, and the domain error taxonomy.

pub mod actor;
pub mod chat;
pub mod error;
pub mod event;
pub mod order;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Domain re-exports (for convenient access)
pub use actor::{ActorRole, AdminCapability};
pub use chat::{ChatMessage, ChatRole, SendMessage, ThreadSummary};
pub use error::{MarketError, MarketResult};
pub use event::MarketEvent;
pub use order::{Offer, OfferItem, Order, OrderItem, OrderStatus};

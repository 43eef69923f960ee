//! Tender Client - HTTP client and consumer-side state for the tender server
//!
//! Two halves:
//!
//! - Transport ([`HttpClient`]): thin REST verbs that attach the actor
//!   identity headers and unwrap the server's response envelope.
//! - Consumer state ([`ChatFeed`], [`ThreadPoller`]): optimistic local
//!   echo for chat and a thread list that merges polled snapshots with
//!   pushed events. Both are pure state machines; the caller owns the
//!   polling cadence.

pub mod config;
pub mod echo;
pub mod error;
pub mod http;
pub mod poller;

pub use config::ClientConfig;
pub use echo::{ChatFeed, FeedEntry, Reconciled, ECHO_MATCH_WINDOW_MS};
pub use error::{ClientError, ClientResult};
pub use http::{Envelope, HttpClient};
pub use poller::ThreadPoller;

// Re-export shared types for convenience
pub use shared::chat::{ChatMessage, ChatRole, SendMessage, ThreadSummary};
pub use shared::event::MarketEvent;
pub use shared::ActorRole;

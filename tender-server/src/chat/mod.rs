//! Negotiation chat engine and event fan-out

pub mod channel;
pub mod threads;

pub use channel::ChannelHub;
pub use threads::ChatThreadManager;

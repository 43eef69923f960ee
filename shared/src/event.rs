//! Push event payloads
//!
//! Events are broadcast per order after the owning transaction
//! commits. Delivery is best-effort: consumers must tolerate drops,
//! duplicates and reordering, and reconcile against polled state
//! (messages merge by their stable IDs).

use crate::chat::ChatMessage;
use crate::order::OrderStatus;
use serde::{Deserialize, Serialize};

/// Everything a subscriber can observe about an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketEvent {
    OrderCreated {
        order_id: u64,
        at: i64,
    },
    /// Header or item display fields changed
    OrderUpdated {
        order_id: u64,
    },
    StatusChanged {
        order_id: u64,
        status: OrderStatus,
        at: i64,
    },
    OfferSubmitted {
        order_id: u64,
        offer_id: u64,
        supplier_name: String,
    },
    OfferUpdated {
        order_id: u64,
        offer_id: u64,
    },
    /// `offer_item_id` is `None` when the toggle reset the winner
    WinnerToggled {
        order_id: u64,
        order_item_id: u64,
        offer_item_id: Option<u64>,
    },
    /// Approval committed: prices locked in, chats archived
    ProposalIssued {
        order_id: u64,
    },
    ChatPosted {
        order_id: u64,
        message: ChatMessage,
    },
    ThreadRead {
        order_id: u64,
        counterparty_id: u64,
        reader_id: u64,
    },
    ThreadArchived {
        order_id: u64,
        counterparty_id: u64,
        archived: bool,
    },
}

impl MarketEvent {
    /// The order whose channel this event is published on
    pub fn order_id(&self) -> u64 {
        match self {
            Self::OrderCreated { order_id, .. }
            | Self::OrderUpdated { order_id }
            | Self::StatusChanged { order_id, .. }
            | Self::OfferSubmitted { order_id, .. }
            | Self::OfferUpdated { order_id, .. }
            | Self::WinnerToggled { order_id, .. }
            | Self::ProposalIssued { order_id }
            | Self::ChatPosted { order_id, .. }
            | Self::ThreadRead { order_id, .. }
            | Self::ThreadArchived { order_id, .. } => *order_id,
        }
    }
}

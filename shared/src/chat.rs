//! Negotiation chat types
//!
//! A thread is not stored as an entity. It is the derived grouping of
//! messages by `(order_id, counterparty)`, where the counterparty is
//! whichever end of the conversation is not the admin desk.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chat participant role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatRole {
    Admin,
    Buyer,
    Supplier,
}

/// One persisted chat message
///
/// Message IDs come from a global sequence, so they are unique and
/// totally ordered across the system. The body is immutable; only the
/// `read` and `archived` flags change after insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Globally sequenced message ID (stable ordering key)
    pub id: u64,
    pub order_id: u64,
    pub sender_role: ChatRole,
    pub sender_id: u64,
    /// Sender display name snapshot
    pub sender_name: String,
    /// Account the message is directed at
    pub recipient_id: u64,
    pub body: String,
    /// Opaque attachment reference (storage is external)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    /// Order item this message discusses, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ref: Option<u64>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub archived: bool,
    /// Insert timestamp (Unix millis)
    pub created_at: i64,
    /// Client idempotency key, echoed back for local-echo reconciliation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<Uuid>,
}

impl ChatMessage {
    /// The non-admin end of the conversation (thread grouping key)
    pub fn counterparty_id(&self) -> u64 {
        if self.sender_role == ChatRole::Admin {
            self.recipient_id
        } else {
            self.sender_id
        }
    }

    /// Whether this message belongs to the `(order, counterparty)` thread
    pub fn in_thread(&self, order_id: u64, counterparty_id: u64) -> bool {
        self.order_id == order_id && self.counterparty_id() == counterparty_id
    }
}

/// Input for sending a message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SendMessage {
    pub order_id: u64,
    pub sender_role: ChatRole,
    pub sender_id: u64,
    pub sender_name: String,
    pub recipient_id: u64,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ref: Option<u64>,
    /// Idempotency key minted by the sending client
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_msg_id: Option<Uuid>,
}

/// Aggregated view of one `(order, counterparty)` thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThreadSummary {
    pub order_id: u64,
    pub counterparty_id: u64,
    pub counterparty_name: String,
    pub counterparty_role: ChatRole,
    /// Body of the newest message (preview)
    pub last_message: String,
    pub last_message_at: i64,
    /// Messages directed at the viewer and not yet read
    pub unread: u64,
    /// A thread is archived only while every message in it is archived
    pub archived: bool,
}

//! Caller identity as presented on the wire
//!
//! Authentication is out of scope; the upstream gateway injects the
//! resolved identity via headers and this crate only names the roles.

use crate::chat::ChatRole;
use serde::{Deserialize, Serialize};

/// Role of the party behind a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorRole {
    /// Full back-office access
    Admin,
    /// Sourcing-desk staff; admin chat identity, limited overrides
    Operator,
    /// The ordering customer
    Buyer,
    /// A quoting supplier
    Supplier,
}

impl ActorRole {
    /// Parse a header value, case-insensitive
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Some(Self::Admin),
            "OPERATOR" => Some(Self::Operator),
            "BUYER" => Some(Self::Buyer),
            "SUPPLIER" => Some(Self::Supplier),
            _ => None,
        }
    }

    /// Chat identity of this role; the desk chats as one admin end
    pub fn as_chat_role(&self) -> ChatRole {
        match self {
            Self::Admin | Self::Operator => ChatRole::Admin,
            Self::Buyer => ChatRole::Buyer,
            Self::Supplier => ChatRole::Supplier,
        }
    }

    /// Capability token for privileged operations, if this role carries it
    ///
    /// Forcing an order status and wiping storage take an
    /// `AdminCapability` parameter, so a call site that skipped the
    /// role check does not compile.
    pub fn admin_capability(&self) -> Option<AdminCapability> {
        match self {
            Self::Admin | Self::Operator => Some(AdminCapability { _priv: () }),
            Self::Buyer | Self::Supplier => None,
        }
    }
}

impl std::fmt::Display for ActorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Admin => "ADMIN",
            Self::Operator => "OPERATOR",
            Self::Buyer => "BUYER",
            Self::Supplier => "SUPPLIER",
        };
        write!(f, "{}", s)
    }
}

/// Proof that the caller holds a back-office role
///
/// Only obtainable through [`ActorRole::admin_capability`].
#[derive(Debug, Clone, Copy)]
pub struct AdminCapability {
    _priv: (),
}

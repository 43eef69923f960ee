//! Domain error taxonomy
//!
//! Every failure mode of the sourcing engine maps to one variant with
//! a stable code. The server layer translates these into HTTP
//! responses; callers branch on the variant, not on message text.
//!
//! Incomplete winner coverage at approval time is deliberately NOT an
//! error: it is a confirmation gate returned as a success payload
//! (see `ApprovalOutcome::IncompleteCoverage`).

use crate::order::OrderStatus;
use thiserror::Error;

/// Errors produced by the sourcing engine
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MarketError {
    /// A submitted field failed validation; names the offending item
    #[error("Validation failed for {item}: {reason}")]
    Validation { item: String, reason: String },

    /// The (order, supplier) pair already has an offer
    #[error("Supplier {supplier} already submitted an offer for order {order_id}")]
    DuplicateOffer { order_id: u64, supplier: String },

    /// The order left the bidding window; quotes are frozen
    #[error("Bidding is closed for order {order_id} (status {status})")]
    BiddingClosed { order_id: u64, status: OrderStatus },

    /// Another editor holds a live lease on the offer
    #[error("Offer {offer_id} is locked by another editor ({remaining_secs}s remaining)")]
    LockHeld { offer_id: u64, remaining_secs: i64 },

    /// A heartbeat arrived with no live lease to renew
    #[error("No live edit lease on offer {0}")]
    LeaseExpired(u64),

    /// The requested status change is not on the canonical chain
    #[error("Cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Terminal orders admit no further mutation
    #[error("Order {order_id} is terminal ({status})")]
    Terminal { order_id: u64, status: OrderStatus },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },

    /// A multi-row write failed; the whole transaction was rolled back
    #[error("Transaction failed: {0}")]
    Transaction(String),
}

impl MarketError {
    /// Shorthand for the common not-found case
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        Self::NotFound { entity, id }
    }

    /// Shorthand for a per-item validation failure
    pub fn validation(item: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            item: item.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::DuplicateOffer { .. } => "DUPLICATE_OFFER",
            Self::BiddingClosed { .. } => "BIDDING_CLOSED",
            Self::LockHeld { .. } => "LOCK_HELD",
            Self::LeaseExpired(_) => "LEASE_EXPIRED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::Terminal { .. } => "TERMINAL_STATUS",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Transaction(_) => "TRANSACTION",
        }
    }
}

pub type MarketResult<T> = Result<T, MarketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_distinct() {
        let errors = [
            MarketError::validation("item", "reason"),
            MarketError::DuplicateOffer {
                order_id: 1,
                supplier: "A".to_string(),
            },
            MarketError::BiddingClosed {
                order_id: 1,
                status: OrderStatus::ProposalSent,
            },
            MarketError::LockHeld {
                offer_id: 1,
                remaining_secs: 10,
            },
            MarketError::LeaseExpired(1),
            MarketError::InvalidTransition {
                from: OrderStatus::Processing,
                to: OrderStatus::Completed,
            },
            MarketError::Terminal {
                order_id: 1,
                status: OrderStatus::Cancelled,
            },
            MarketError::not_found("order", 1),
            MarketError::Transaction("boom".to_string()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }
}

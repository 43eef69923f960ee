//! Canonical order status machine
//!
//! Exactly one `OrderStatus` is stored per order. What each audience
//! sees is a projection computed from the canonical value (plus the
//! order's `bidding_started` flag for suppliers), never a second
//! stored status.

use serde::{Deserialize, Serialize};

/// Canonical order status
///
/// The workflow is linear. `ManualProcessing` is an optional branch
/// between `Processing` and `ProposalReady`. `Cancelled` and `Refused`
/// are terminal and admit no further transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Processing,
    ManualProcessing,
    ProposalReady,
    ProposalSent,
    ReadyToBuy,
    SupplierConfirmed,
    AwaitingPayment,
    InTransit,
    Completed,
    Cancelled,
    Refused,
}

/// Who is looking at the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Audience {
    Admin,
    Buyer,
    Supplier,
}

impl OrderStatus {
    /// Next status along the canonical chain
    ///
    /// Returns `None` for `Completed` and the terminal statuses.
    /// `Processing` advances straight to `ProposalReady`; the manual
    /// branch is entered explicitly, not by advancing.
    pub fn next(&self) -> Option<OrderStatus> {
        match self {
            Self::Processing => Some(Self::ProposalReady),
            Self::ManualProcessing => Some(Self::ProposalReady),
            Self::ProposalReady => Some(Self::ProposalSent),
            Self::ProposalSent => Some(Self::ReadyToBuy),
            Self::ReadyToBuy => Some(Self::SupplierConfirmed),
            Self::SupplierConfirmed => Some(Self::AwaitingPayment),
            Self::AwaitingPayment => Some(Self::InTransit),
            Self::InTransit => Some(Self::Completed),
            Self::Completed | Self::Cancelled | Self::Refused => None,
        }
    }

    /// Terminal statuses admit no further mutation
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Refused)
    }

    /// Whether the order is still collecting and ranking offers
    ///
    /// Offer submission, offer edits and winner toggles are only
    /// accepted while this holds. Approval moves the order past it.
    pub fn is_bidding_open(&self) -> bool {
        matches!(
            self,
            Self::Processing | Self::ManualProcessing | Self::ProposalReady
        )
    }

    /// The one edge `advance` refuses to walk
    ///
    /// Entering `ProposalSent` carries committed prices and archives
    /// chats, so it belongs exclusively to the approval path.
    pub fn is_approval_gate(&self) -> bool {
        matches!(self, Self::ProposalSent)
    }

    /// Label shown to the given audience
    pub fn label_for(&self, audience: Audience, bidding_started: bool) -> &'static str {
        match audience {
            Audience::Admin => self.admin_label(),
            Audience::Buyer => self.buyer_label(),
            Audience::Supplier => self.supplier_label(bidding_started),
        }
    }

    fn admin_label(&self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::ManualProcessing => "Manual processing",
            Self::ProposalReady => "Proposal ready",
            Self::ProposalSent => "Proposal sent",
            Self::ReadyToBuy => "Ready to buy",
            Self::SupplierConfirmed => "Supplier confirmed",
            Self::AwaitingPayment => "Awaiting payment",
            Self::InTransit => "In transit",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refused => "Refused by client",
        }
    }

    fn buyer_label(&self) -> &'static str {
        match self {
            // The buyer does not see internal sourcing stages
            Self::Processing | Self::ManualProcessing | Self::ProposalReady => "Processing",
            Self::ProposalSent => "Proposal received",
            Self::ReadyToBuy => "Ready to buy",
            Self::SupplierConfirmed => "Order confirmed",
            Self::AwaitingPayment => "Awaiting payment",
            Self::InTransit => "In transit",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Refused => "Refused",
        }
    }

    fn supplier_label(&self, bidding_started: bool) -> &'static str {
        match self {
            Self::Processing | Self::ManualProcessing | Self::ProposalReady => {
                if bidding_started {
                    "Bidding in progress"
                } else {
                    "New request"
                }
            }
            Self::ProposalSent => "Bidding closed",
            Self::ReadyToBuy => "Awaiting purchase order",
            Self::SupplierConfirmed => "Order confirmed",
            Self::AwaitingPayment => "Awaiting payment",
            Self::InTransit => "In transit",
            Self::Completed => "Completed",
            Self::Cancelled | Self::Refused => "Closed",
        }
    }

    /// Happy-path steps for progress displays, in order
    pub fn progress_steps() -> &'static [OrderStatus] {
        &[
            Self::Processing,
            Self::ProposalReady,
            Self::ProposalSent,
            Self::ReadyToBuy,
            Self::SupplierConfirmed,
            Self::AwaitingPayment,
            Self::InTransit,
            Self::Completed,
        ]
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.admin_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_linear_and_ends_at_completed() {
        let mut status = OrderStatus::Processing;
        let mut steps = 0;
        while let Some(next) = status.next() {
            status = next;
            steps += 1;
            assert!(steps < 16, "chain must terminate");
        }
        assert_eq!(status, OrderStatus::Completed);
    }

    #[test]
    fn test_manual_branch_rejoins_chain() {
        assert_eq!(
            OrderStatus::ManualProcessing.next(),
            Some(OrderStatus::ProposalReady)
        );
        // Advancing from Processing skips the manual branch entirely
        assert_eq!(
            OrderStatus::Processing.next(),
            Some(OrderStatus::ProposalReady)
        );
    }

    #[test]
    fn test_terminals_have_no_next() {
        assert!(OrderStatus::Cancelled.next().is_none());
        assert!(OrderStatus::Refused.next().is_none());
        assert!(OrderStatus::Completed.next().is_none());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(OrderStatus::Refused.is_terminal());
        assert!(!OrderStatus::Completed.is_terminal());
    }

    #[test]
    fn test_bidding_window() {
        assert!(OrderStatus::Processing.is_bidding_open());
        assert!(OrderStatus::ManualProcessing.is_bidding_open());
        assert!(OrderStatus::ProposalReady.is_bidding_open());
        assert!(!OrderStatus::ProposalSent.is_bidding_open());
        assert!(!OrderStatus::Cancelled.is_bidding_open());
    }

    #[test]
    fn test_supplier_projection_tracks_bidding_flag() {
        let s = OrderStatus::Processing;
        assert_eq!(s.label_for(Audience::Supplier, false), "New request");
        assert_eq!(s.label_for(Audience::Supplier, true), "Bidding in progress");
        // Other audiences ignore the flag
        assert_eq!(s.label_for(Audience::Admin, true), "Processing");
        assert_eq!(s.label_for(Audience::Buyer, true), "Processing");
    }

    #[test]
    fn test_one_canonical_status_many_labels() {
        let s = OrderStatus::ProposalSent;
        assert_eq!(s.label_for(Audience::Admin, true), "Proposal sent");
        assert_eq!(s.label_for(Audience::Buyer, true), "Proposal received");
        assert_eq!(s.label_for(Audience::Supplier, true), "Bidding closed");
    }
}

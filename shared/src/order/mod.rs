//! Order and offer domain types
//!
//! This module provides the entities the sourcing workflow persists:
//! - Orders and their line items (what the buyer wants)
//! - Offers and their line items (what each supplier quotes)
//! - Draft value objects carrying unsaved admin/supplier input
//! - Read-side views (bid board, approval outcome)

pub mod status;

// Re-exports
pub use status::{Audience, OrderStatus};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Currency
// ============================================================================

/// Settlement currency for quoted and committed prices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Currency {
    #[default]
    Rub,
    Usd,
    Cny,
}

// ============================================================================
// Order
// ============================================================================

/// A buyer's sourcing request
///
/// Line items live in their own rows (see [`OrderItem`]); the order
/// header carries buyer identity and workflow state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order number, allocated from a crash-safe counter
    pub id: u64,
    /// Buyer account ID
    pub buyer_id: u64,
    /// Buyer display name snapshot
    pub buyer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    /// Delivery location (free text)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Canonical workflow status (single source of truth)
    pub status: OrderStatus,
    /// Set when the first offer arrives; drives the supplier-facing
    /// status projection
    #[serde(default)]
    pub bidding_started: bool,
    /// Reason recorded when the order was cancelled or refused
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refusal_reason: Option<String>,
    /// Optional sourcing deadline (Unix millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    /// Creation timestamp (Unix millis)
    pub created_at: i64,
    /// Timestamp of the last status transition (Unix millis)
    pub status_updated_at: i64,
}

impl Order {
    /// Label for the given audience (projection of the canonical status)
    pub fn status_label(&self, audience: Audience) -> &'static str {
        self.status.label_for(audience, self.bidding_started)
    }
}

/// One requested line item
///
/// Identity fields are immutable after creation; display fields may be
/// corrected by an admin while the order is live. Commit fields are
/// written only by winner promotion and cleared by winner reset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub id: u64,
    pub order_id: u64,
    /// Requested part name
    pub name: String,
    /// Requested quantity
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Manufacturer article / part number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    /// Unit of measure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Price committed from the winning quote (buyer currency)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_currency: Option<Currency>,
}

// ============================================================================
// Offer
// ============================================================================

/// A supplier's competitive quote for an order
///
/// At most one offer exists per (order, supplier) pair. The lock
/// fields hold the advisory edit lease; expiry is purely time based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    pub id: u64,
    pub order_id: u64,
    /// Supplier account ID (duplicate-prevention key together with order)
    pub supplier_id: u64,
    /// Supplier display name snapshot
    pub supplier_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_phone: Option<String>,
    /// Submission timestamp (Unix millis)
    pub submitted_at: i64,
    /// Last supplier revision timestamp (Unix millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// Edit lease start (Unix millis); `None` = not leased
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_at: Option<i64>,
    /// Actor holding the edit lease
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_by: Option<u64>,
}

/// One quoted line item within an offer
///
/// `offered_quantity == 0` means the supplier declined the item (no
/// stock); declined items bypass price/weight/delivery validation and
/// never compete for winner selection or best-value indicators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OfferItem {
    pub id: u64,
    pub offer_id: u64,
    /// Requested item this quote answers; `None` falls back to a
    /// case-insensitive name match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_item_id: Option<u64>,
    pub name: String,
    /// Quantity the supplier can deliver (0 = declined)
    pub offered_quantity: u32,
    /// Quoted unit price in the supplier's currency
    pub price: Decimal,
    pub currency: Currency,
    /// Unit weight in kilograms
    pub weight_kg: f64,
    /// Promised delivery time in days
    pub delivery_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// Provisional winner flag (at most one per order item)
    #[serde(default)]
    pub winner: bool,

    // === Admin commit fields (written by winner promotion) ===
    /// Final buyer-facing price entered by the admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_currency: Option<Currency>,
    /// Delivery cost rate used when computing the commit price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
    /// Delivery estimate shown to the buyer, in weeks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_delivery_weeks: Option<u32>,
}

impl OfferItem {
    /// Whether the supplier declined this item (no stock)
    pub fn is_declined(&self) -> bool {
        self.offered_quantity == 0
    }

    /// Resolve which order item this quote answers
    ///
    /// Explicit `order_item_id` wins; otherwise the first
    /// case-insensitive name match among the order's items.
    pub fn resolve_target(&self, order_items: &[OrderItem]) -> Option<u64> {
        if let Some(id) = self.order_item_id
            && order_items.iter().any(|it| it.id == id)
        {
            return Some(id);
        }
        order_items
            .iter()
            .find(|it| it.name.eq_ignore_ascii_case(&self.name))
            .map(|it| it.id)
    }

    /// Clear the winner flag and commit fields
    pub fn clear_winner(&mut self) {
        self.winner = false;
        self.commit_price = None;
        self.commit_currency = None;
        self.delivery_rate = None;
        self.admin_comment = None;
        self.client_delivery_weeks = None;
    }
}

// ============================================================================
// Drafts (unsaved input)
// ============================================================================

/// Input for creating an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDraft {
    pub buyer_id: u64,
    pub buyer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
    pub items: Vec<OrderItemDraft>,
}

/// Input for one requested line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDraft {
    pub name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Sparse edit of an order item's display fields
///
/// `None` = no change. Identity (`id`, `order_id`) and commit fields
/// are not editable through this path.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderItemEdit {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Sparse edit of order-header contact fields
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderMetadataEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buyer_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<i64>,
}

/// Supplier identity attached to an offer submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplierIdent {
    pub id: u64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Input for one quoted line item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferItemDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_item_id: Option<u64>,
    pub name: String,
    /// 0 declines the item and bypasses the remaining validation
    pub offered_quantity: u32,
    pub price: Decimal,
    #[serde(default)]
    pub currency: Currency,
    pub weight_kg: f64,
    pub delivery_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Admin input for promoting a quote to provisional winner
///
/// Short-lived value object: it exists only for the duration of the
/// toggle call and is persisted onto the offer item, never stored as
/// a draft anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinnerDraft {
    /// Final buyer-facing price (already converted to the buyer currency)
    pub commit_price: Decimal,
    #[serde(default)]
    pub commit_currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_delivery_weeks: Option<u32>,
}

// ============================================================================
// Read-side views
// ============================================================================

/// Full order with its items and offers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub offers: Vec<OfferDetail>,
}

/// Offer with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferDetail {
    pub offer: Offer,
    pub items: Vec<OfferItem>,
}

/// Result of a winner toggle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ToggleOutcome {
    /// The quote became the provisional winner (competitors demoted)
    Promoted {
        order_item_id: u64,
        offer_item_id: u64,
    },
    /// The quote was already the winner and was reset
    Reset {
        order_item_id: u64,
        offer_item_id: u64,
    },
}

/// Result of an approval request
///
/// Incomplete coverage is a confirmation gate, not an error: the
/// caller re-invokes with the override flag after user confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalOutcome {
    Committed { order_id: u64, winners: usize },
    IncompleteCoverage { missing: Vec<String> },
}

/// Competitive comparison for one order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidBoard {
    pub order_id: u64,
    pub rows: Vec<BidBoardRow>,
}

/// All quotes answering one order item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidBoardRow {
    pub order_item_id: u64,
    pub item_name: String,
    pub entries: Vec<BidBoardEntry>,
}

/// One quote in the comparison
///
/// The best-* flags are advisory indicators over non-declined quotes;
/// they never restrict which quote may be promoted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidBoardEntry {
    pub offer_id: u64,
    pub offer_item_id: u64,
    pub supplier_name: String,
    pub offered_quantity: u32,
    pub price: Decimal,
    pub currency: Currency,
    pub delivery_days: u32,
    pub declined: bool,
    pub winner: bool,
    pub best_price: bool,
    pub best_delivery: bool,
}

//! Quote validation bounds and price rounding
//!
//! All monetary values are `Decimal`; weights are `f64` and must be
//! finite. A declined line (`offered_quantity == 0`) skips every bound
//! check, a supplier declining an item owes no price for it.

use rust_decimal::prelude::*;
use shared::error::{MarketError, MarketResult};
use shared::order::{OfferItemDraft, WinnerDraft};

/// Rounding for buyer-facing prices (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum unit price (1,000,000 in any currency)
const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

/// Maximum quoted quantity per line
const MAX_QUANTITY: u32 = 9_999;

/// Maximum unit weight in kilograms
const MAX_WEIGHT_KG: f64 = 100_000.0;

/// Maximum promised delivery time in days
const MAX_DELIVERY_DAYS: u32 = 365;

/// Round a price to the buyer-facing precision
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate a quoted line before it is persisted
///
/// Declined lines pass unconditionally.
pub fn validate_quote_line(line: &OfferItemDraft) -> MarketResult<()> {
    if line.name.trim().is_empty() {
        return Err(MarketError::validation("name", "item name must not be empty"));
    }

    // A zero quantity means "cannot supply this item"
    if line.offered_quantity == 0 {
        return Ok(());
    }

    if line.offered_quantity > MAX_QUANTITY {
        return Err(MarketError::validation(
            &line.name,
            format!(
                "offered quantity exceeds maximum allowed ({}), got {}",
                MAX_QUANTITY, line.offered_quantity
            ),
        ));
    }

    if line.price <= Decimal::ZERO {
        return Err(MarketError::validation(
            &line.name,
            format!("price must be positive, got {}", line.price),
        ));
    }
    if line.price > MAX_UNIT_PRICE {
        return Err(MarketError::validation(
            &line.name,
            format!(
                "price exceeds maximum allowed ({}), got {}",
                MAX_UNIT_PRICE, line.price
            ),
        ));
    }

    if !line.weight_kg.is_finite() {
        return Err(MarketError::validation(
            &line.name,
            format!("weight must be a finite number, got {}", line.weight_kg),
        ));
    }
    if line.weight_kg <= 0.0 {
        return Err(MarketError::validation(
            &line.name,
            format!("weight must be positive, got {}", line.weight_kg),
        ));
    }
    if line.weight_kg > MAX_WEIGHT_KG {
        return Err(MarketError::validation(
            &line.name,
            format!(
                "weight exceeds maximum allowed ({}), got {}",
                MAX_WEIGHT_KG, line.weight_kg
            ),
        ));
    }

    if line.delivery_days == 0 {
        return Err(MarketError::validation(
            &line.name,
            "delivery time must be at least one day",
        ));
    }
    if line.delivery_days > MAX_DELIVERY_DAYS {
        return Err(MarketError::validation(
            &line.name,
            format!(
                "delivery time exceeds maximum allowed ({}), got {}",
                MAX_DELIVERY_DAYS, line.delivery_days
            ),
        ));
    }

    Ok(())
}

/// Validate admin input before a winner promotion
pub fn validate_winner_draft(draft: &WinnerDraft) -> MarketResult<()> {
    if draft.commit_price <= Decimal::ZERO {
        return Err(MarketError::validation(
            "commit_price",
            format!("commit price must be positive, got {}", draft.commit_price),
        ));
    }
    if draft.commit_price > MAX_UNIT_PRICE {
        return Err(MarketError::validation(
            "commit_price",
            format!(
                "commit price exceeds maximum allowed ({}), got {}",
                MAX_UNIT_PRICE, draft.commit_price
            ),
        ));
    }
    if let Some(rate) = draft.delivery_rate
        && rate < Decimal::ZERO
    {
        return Err(MarketError::validation(
            "delivery_rate",
            format!("delivery rate must not be negative, got {}", rate),
        ));
    }
    Ok(())
}

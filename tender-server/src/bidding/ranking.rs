//! Winner selection and the competitive bid board
//!
//! At most one quote per order item carries the winner mark. Promotion
//! demotes every competitor for the same item in the same transaction,
//! so the invariant holds even across offers that target the item by
//! name instead of ID.

use rust_decimal::Decimal;
use shared::error::{MarketError, MarketResult};
use shared::event::MarketEvent;
use shared::order::{
    BidBoard, BidBoardEntry, BidBoardRow, OfferItem, ToggleOutcome, WinnerDraft,
};

use crate::bidding::lock::EditLockGuard;
use crate::bidding::money;
use crate::chat::ChannelHub;
use crate::store::{EntityStore, StoreError};
use crate::utils::now_millis;

/// Winner toggling and quote comparison
#[derive(Debug, Clone)]
pub struct RankEngine {
    store: EntityStore,
    hub: ChannelHub,
    locks: EditLockGuard,
}

impl RankEngine {
    pub fn new(store: EntityStore, hub: ChannelHub, locks: EditLockGuard) -> Self {
        Self { store, hub, locks }
    }

    /// Toggle a quote's winner mark
    ///
    /// A non-winner is promoted: competitors answering the same order
    /// item are demoted and the committed price lands on both the quote
    /// and the order item. A current winner is reset, leaving the item
    /// with no winner. Both shapes are one transaction.
    ///
    /// Without a [`WinnerDraft`] the quoted price is committed as-is.
    pub fn toggle_winner(
        &self,
        order_id: u64,
        offer_item_id: u64,
        draft: Option<WinnerDraft>,
        actor_id: u64,
    ) -> MarketResult<ToggleOutcome> {
        if let Some(draft) = &draft {
            money::validate_winner_draft(draft)?;
        }

        let now = now_millis();
        let txn = self.store.begin_write()?;

        // 1. Order must exist and still be in the bidding window
        let order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or(MarketError::not_found("order", order_id))?;
        if order.status.is_terminal() {
            return Err(MarketError::Terminal {
                order_id,
                status: order.status,
            });
        }
        if !order.status.is_bidding_open() {
            return Err(MarketError::BiddingClosed {
                order_id,
                status: order.status,
            });
        }

        // 2. Resolve the quote and the order item it answers
        let mut target = self
            .store
            .get_offer_item_txn(&txn, offer_item_id)?
            .ok_or(MarketError::not_found("offer_item", offer_item_id))?;
        let offer = self
            .store
            .get_offer_txn(&txn, target.offer_id)?
            .filter(|o| o.order_id == order_id)
            .ok_or(MarketError::not_found("offer_item", offer_item_id))?;
        if let Some(remaining_secs) = self.locks.held_by_other(&offer, actor_id, now) {
            return Err(MarketError::LockHeld {
                offer_id: offer.id,
                remaining_secs,
            });
        }

        let order_items = self.store.items_for_order_txn(&txn, order_id)?;
        let order_item_id = target.resolve_target(&order_items).ok_or_else(|| {
            MarketError::validation(&target.name, "quote does not match any requested item")
        })?;
        let mut order_item = self
            .store
            .get_order_item_txn(&txn, order_item_id)?
            .ok_or(MarketError::not_found("order_item", order_item_id))?;

        // 3. Reset path: the quote already wins
        if target.winner {
            target.clear_winner();
            self.store.put_offer_item(&txn, &target)?;
            order_item.commit_price = None;
            order_item.commit_currency = None;
            self.store.put_order_item(&txn, &order_item)?;
            txn.commit().map_err(StoreError::from)?;

            self.hub.publish(MarketEvent::WinnerToggled {
                order_id,
                order_item_id,
                offer_item_id: None,
            });
            tracing::info!(order_id, order_item_id, offer_item_id, "Winner reset");
            return Ok(ToggleOutcome::Reset {
                order_item_id,
                offer_item_id,
            });
        }

        // 4. Promote path
        if target.is_declined() {
            return Err(MarketError::validation(
                &target.name,
                "a declined quote cannot win",
            ));
        }

        // Demote every competitor answering the same item
        for competitor_offer in self.store.offers_for_order_txn(&txn, order_id)? {
            for mut item in self.store.items_for_offer_txn(&txn, competitor_offer.id)? {
                if item.id != target.id
                    && item.winner
                    && item.resolve_target(&order_items) == Some(order_item_id)
                {
                    item.clear_winner();
                    self.store.put_offer_item(&txn, &item)?;
                }
            }
        }

        let (commit_price, commit_currency) = match draft {
            Some(draft) => {
                target.delivery_rate = draft.delivery_rate;
                target.admin_comment = draft.admin_comment;
                target.client_delivery_weeks = draft.client_delivery_weeks;
                (money::round_price(draft.commit_price), draft.commit_currency)
            }
            None => (money::round_price(target.price), target.currency),
        };
        target.winner = true;
        target.commit_price = Some(commit_price);
        target.commit_currency = Some(commit_currency);
        self.store.put_offer_item(&txn, &target)?;

        order_item.commit_price = Some(commit_price);
        order_item.commit_currency = Some(commit_currency);
        self.store.put_order_item(&txn, &order_item)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::WinnerToggled {
            order_id,
            order_item_id,
            offer_item_id: Some(offer_item_id),
        });
        tracing::info!(order_id, order_item_id, offer_item_id, "Winner promoted");
        Ok(ToggleOutcome::Promoted {
            order_item_id,
            offer_item_id,
        })
    }

    /// Quote comparison per order item with best-price and
    /// best-delivery badges
    ///
    /// Declined quotes appear on the board but never carry a badge.
    /// Prices are compared numerically; quotes for one order arrive in
    /// the order currency.
    pub fn bid_board(&self, order_id: u64) -> MarketResult<BidBoard> {
        self.store
            .get_order(order_id)?
            .ok_or(MarketError::not_found("order", order_id))?;
        let order_items = self.store.items_for_order(order_id)?;

        // Collect (supplier, quote) pairs once
        let mut quotes: Vec<(String, u64, OfferItem)> = Vec::new();
        for offer in self.store.offers_for_order(order_id)? {
            for item in self.store.items_for_offer(offer.id)? {
                quotes.push((offer.supplier_name.clone(), offer.id, item));
            }
        }

        let mut rows = Vec::with_capacity(order_items.len());
        for order_item in &order_items {
            let answering: Vec<&(String, u64, OfferItem)> = quotes
                .iter()
                .filter(|(_, _, q)| q.resolve_target(&order_items) == Some(order_item.id))
                .collect();

            let best_price: Option<Decimal> = answering
                .iter()
                .filter(|(_, _, q)| !q.is_declined())
                .map(|(_, _, q)| q.price)
                .min();
            let best_delivery: Option<u32> = answering
                .iter()
                .filter(|(_, _, q)| !q.is_declined())
                .map(|(_, _, q)| q.delivery_days)
                .min();

            let entries = answering
                .iter()
                .map(|(supplier_name, offer_id, q)| BidBoardEntry {
                    offer_id: *offer_id,
                    offer_item_id: q.id,
                    supplier_name: supplier_name.clone(),
                    offered_quantity: q.offered_quantity,
                    price: q.price,
                    currency: q.currency,
                    delivery_days: q.delivery_days,
                    declined: q.is_declined(),
                    winner: q.winner,
                    best_price: !q.is_declined() && best_price == Some(q.price),
                    best_delivery: !q.is_declined() && best_delivery == Some(q.delivery_days),
                })
                .collect();

            rows.push(BidBoardRow {
                order_item_id: order_item.id,
                item_name: order_item.name.clone(),
                entries,
            });
        }

        Ok(BidBoard { order_id, rows })
    }
}

//! Offer intake from suppliers
//!
//! One offer per (order, supplier). Submitting the first offer flips
//! the order's `bidding_started` flag; editing an offer goes through
//! the edit lease and drops it on save.

use shared::error::{MarketError, MarketResult};
use shared::event::MarketEvent;
use shared::order::{Offer, OfferDetail, OfferItem, OfferItemDraft, OrderItem, SupplierIdent};

use crate::bidding::lock::EditLockGuard;
use crate::bidding::money;
use crate::chat::ChannelHub;
use crate::store::{EntityStore, StoreError};
use crate::utils::now_millis;

/// Offer intake and editing
#[derive(Debug, Clone)]
pub struct BidCollector {
    store: EntityStore,
    hub: ChannelHub,
    locks: EditLockGuard,
}

impl BidCollector {
    pub fn new(store: EntityStore, hub: ChannelHub, locks: EditLockGuard) -> Self {
        Self { store, hub, locks }
    }

    /// Accept a supplier's quote for an order
    ///
    /// A line with `offered_quantity == 0` declines that item and is
    /// stored as-is; every other line must carry a positive price,
    /// weight and delivery time.
    pub fn submit_offer(
        &self,
        order_id: u64,
        supplier: SupplierIdent,
        lines: Vec<OfferItemDraft>,
    ) -> MarketResult<OfferDetail> {
        // 1. Validate every line up front
        if lines.is_empty() {
            return Err(MarketError::validation(
                "items",
                "an offer needs at least one line",
            ));
        }
        for line in &lines {
            money::validate_quote_line(line)?;
        }

        let now = now_millis();
        let txn = self.store.begin_write()?;

        // 2. The order must exist and still accept quotes
        let mut order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or(MarketError::not_found("order", order_id))?;
        if !order.status.is_bidding_open() {
            return Err(MarketError::BiddingClosed {
                order_id,
                status: order.status,
            });
        }

        // 3. One offer per supplier per order
        let existing = self.store.offers_for_order_txn(&txn, order_id)?;
        if existing.iter().any(|o| o.supplier_id == supplier.id) {
            return Err(MarketError::DuplicateOffer {
                order_id,
                supplier: supplier.name,
            });
        }

        // 4. Persist offer, lines and the bidding flag together
        let offer = Offer {
            id: self.store.next_entity_id(&txn)?,
            order_id,
            supplier_id: supplier.id,
            supplier_name: supplier.name,
            supplier_phone: supplier.phone,
            submitted_at: now,
            updated_at: None,
            locked_at: None,
            locked_by: None,
        };
        self.store.put_offer(&txn, &offer)?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = OfferItem {
                id: self.store.next_entity_id(&txn)?,
                offer_id: offer.id,
                order_item_id: line.order_item_id,
                name: line.name,
                offered_quantity: line.offered_quantity,
                price: line.price,
                currency: line.currency,
                weight_kg: line.weight_kg,
                delivery_days: line.delivery_days,
                supplier_sku: line.supplier_sku,
                comment: line.comment,
                winner: false,
                commit_price: None,
                commit_currency: None,
                delivery_rate: None,
                admin_comment: None,
                client_delivery_weeks: None,
            };
            self.store.put_offer_item(&txn, &item)?;
            items.push(item);
        }

        if !order.bidding_started {
            order.bidding_started = true;
            self.store.put_order(&txn, &order)?;
        }
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::OfferSubmitted {
            order_id,
            offer_id: offer.id,
            supplier_name: offer.supplier_name.clone(),
        });
        tracing::info!(
            order_id,
            offer_id = offer.id,
            supplier = %offer.supplier_name,
            line_count = items.len(),
            "Offer submitted"
        );

        Ok(OfferDetail { offer, items })
    }

    /// Rework an existing offer's lines
    ///
    /// Lines are matched to existing ones by target item (explicit ID,
    /// falling back to name); matched lines keep their identity and
    /// winner state, unmatched ones are appended. Saving ends the edit
    /// session: the caller's lease is dropped in the same transaction.
    pub fn update_offer(
        &self,
        offer_id: u64,
        actor_id: u64,
        lines: Vec<OfferItemDraft>,
    ) -> MarketResult<OfferDetail> {
        if lines.is_empty() {
            return Err(MarketError::validation(
                "items",
                "an offer needs at least one line",
            ));
        }
        for line in &lines {
            money::validate_quote_line(line)?;
        }

        let now = now_millis();
        let txn = self.store.begin_write()?;
        let mut offer = self
            .store
            .get_offer_txn(&txn, offer_id)?
            .ok_or(MarketError::not_found("offer", offer_id))?;
        let order = self
            .store
            .get_order_txn(&txn, offer.order_id)?
            .ok_or(MarketError::not_found("order", offer.order_id))?;
        if !order.status.is_bidding_open() {
            return Err(MarketError::BiddingClosed {
                order_id: order.id,
                status: order.status,
            });
        }
        if let Some(remaining_secs) = self.locks.held_by_other(&offer, actor_id, now) {
            return Err(MarketError::LockHeld {
                offer_id,
                remaining_secs,
            });
        }

        let order_items = self.store.items_for_order_txn(&txn, order.id)?;
        let mut existing = self.store.items_for_offer_txn(&txn, offer_id)?;

        for line in lines {
            match existing.iter().position(|item| line_matches(item, &line)) {
                Some(idx) => {
                    let item = &mut existing[idx];
                    item.order_item_id = line.order_item_id.or(item.order_item_id);
                    item.name = line.name;
                    item.offered_quantity = line.offered_quantity;
                    item.price = line.price;
                    item.currency = line.currency;
                    item.weight_kg = line.weight_kg;
                    item.delivery_days = line.delivery_days;
                    item.supplier_sku = line.supplier_sku;
                    item.comment = line.comment;
                    // Declining a line a winner was picked from takes the
                    // win back, on the order item too
                    if item.winner && item.is_declined() {
                        self.demote_declined(&txn, item, &order_items)?;
                    }
                    self.store.put_offer_item(&txn, item)?;
                }
                None => {
                    let item = OfferItem {
                        id: self.store.next_entity_id(&txn)?,
                        offer_id,
                        order_item_id: line.order_item_id,
                        name: line.name,
                        offered_quantity: line.offered_quantity,
                        price: line.price,
                        currency: line.currency,
                        weight_kg: line.weight_kg,
                        delivery_days: line.delivery_days,
                        supplier_sku: line.supplier_sku,
                        comment: line.comment,
                        winner: false,
                        commit_price: None,
                        commit_currency: None,
                        delivery_rate: None,
                        admin_comment: None,
                        client_delivery_weeks: None,
                    };
                    self.store.put_offer_item(&txn, &item)?;
                    existing.push(item);
                }
            }
        }

        offer.updated_at = Some(now);
        offer.locked_at = None;
        offer.locked_by = None;
        self.store.put_offer(&txn, &offer)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::OfferUpdated {
            order_id: order.id,
            offer_id,
        });
        tracing::info!(order_id = order.id, offer_id, "Offer updated");

        let items = self.store.items_for_offer(offer_id)?;
        Ok(OfferDetail { offer, items })
    }

    fn demote_declined(
        &self,
        txn: &redb::WriteTransaction,
        item: &mut OfferItem,
        order_items: &[OrderItem],
    ) -> MarketResult<()> {
        let target = item.resolve_target(order_items);
        item.clear_winner();
        if let Some(target_id) = target
            && let Some(mut order_item) = self.store.get_order_item_txn(txn, target_id)?
        {
            order_item.commit_price = None;
            order_item.commit_currency = None;
            self.store.put_order_item(txn, &order_item)?;
        }
        tracing::warn!(
            offer_id = item.offer_id,
            offer_item_id = item.id,
            "Declined line lost its winner mark"
        );
        Ok(())
    }
}

/// Whether a draft line reworks an existing one
///
/// Explicit target IDs pair up when both sides carry one; otherwise
/// the quoted name decides.
fn line_matches(existing: &OfferItem, line: &OfferItemDraft) -> bool {
    if let (Some(a), Some(b)) = (existing.order_item_id, line.order_item_id) {
        return a == b;
    }
    existing.name.eq_ignore_ascii_case(&line.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use shared::order::{Currency, Order, OrderStatus};

    fn setup() -> BidCollector {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store
            .put_order(
                &txn,
                &Order {
                    id: 1,
                    buyer_id: 500,
                    buyer_name: "Volga Motors".to_string(),
                    buyer_phone: None,
                    buyer_email: None,
                    location: None,
                    status: OrderStatus::Processing,
                    bidding_started: false,
                    refusal_reason: None,
                    deadline: None,
                    created_at: now_millis(),
                    status_updated_at: now_millis(),
                },
            )
            .unwrap();
        store
            .put_order_item(
                &txn,
                &OrderItem {
                    id: 100,
                    order_id: 1,
                    name: "Brake Pads".to_string(),
                    quantity: 4,
                    brand: None,
                    article: None,
                    uom: None,
                    comment: None,
                    commit_price: None,
                    commit_currency: None,
                },
            )
            .unwrap();
        txn.commit().unwrap();

        let hub = ChannelHub::new();
        let locks = EditLockGuard::new(store.clone(), 300);
        BidCollector::new(store, hub, locks)
    }

    fn supplier(id: u64, name: &str) -> SupplierIdent {
        SupplierIdent {
            id,
            name: name.to_string(),
            phone: None,
        }
    }

    fn quote_line(price: &str) -> OfferItemDraft {
        OfferItemDraft {
            order_item_id: Some(100),
            name: "Brake Pads".to_string(),
            offered_quantity: 4,
            price: price.parse().unwrap(),
            currency: Currency::Rub,
            weight_kg: 2.0,
            delivery_days: 3,
            supplier_sku: None,
            comment: None,
        }
    }

    #[test]
    fn test_submit_starts_bidding() {
        let svc = setup();
        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();
        assert_eq!(detail.offer.order_id, 1);
        assert_eq!(detail.items.len(), 1);
        assert!(!detail.items[0].winner);

        let order = svc.store.get_order(1).unwrap().unwrap();
        assert!(order.bidding_started);
        // The ladder itself does not move
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn test_duplicate_supplier_rejected() {
        let svc = setup();
        svc.submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();
        let err = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("280")])
            .unwrap_err();
        assert!(matches!(err, MarketError::DuplicateOffer { order_id: 1, .. }));

        // A different supplier still gets in
        assert!(
            svc.submit_offer(1, supplier(702, "Detali Plus"), vec![quote_line("280")])
                .is_ok()
        );
    }

    #[test]
    fn test_submit_rejected_once_bidding_closes() {
        let svc = setup();
        let txn = svc.store.begin_write().unwrap();
        let mut order = svc.store.get_order_txn(&txn, 1).unwrap().unwrap();
        order.status = OrderStatus::ProposalSent;
        svc.store.put_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        let err = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap_err();
        assert!(matches!(err, MarketError::BiddingClosed { .. }));
    }

    #[test]
    fn test_declined_line_is_stored() {
        let svc = setup();
        let mut declined = quote_line("0");
        declined.offered_quantity = 0;
        declined.weight_kg = 0.0;
        declined.delivery_days = 0;

        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![declined])
            .unwrap();
        assert!(detail.items[0].is_declined());
    }

    #[test]
    fn test_invalid_line_rejected() {
        let svc = setup();
        let err = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("0")])
            .unwrap_err();
        assert!(matches!(err, MarketError::Validation { .. }));
        assert!(svc.store.offers_for_order(1).unwrap().is_empty());
    }

    #[test]
    fn test_update_preserves_winner_and_identity() {
        let svc = setup();
        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();
        let offer_id = detail.offer.id;
        let line_id = detail.items[0].id;

        // Mark the line a winner directly
        let txn = svc.store.begin_write().unwrap();
        let mut item = svc.store.get_offer_item_txn(&txn, line_id).unwrap().unwrap();
        item.winner = true;
        item.commit_price = Some(Decimal::new(310, 0));
        svc.store.put_offer_item(&txn, &item).unwrap();
        txn.commit().unwrap();

        let updated = svc.update_offer(offer_id, 701, vec![quote_line("290")]).unwrap();
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].id, line_id);
        assert_eq!(updated.items[0].price, Decimal::new(290, 0));
        assert!(updated.items[0].winner);
        assert_eq!(updated.items[0].commit_price, Some(Decimal::new(310, 0)));
        assert!(updated.offer.updated_at.is_some());
    }

    #[test]
    fn test_update_appends_unmatched_lines() {
        let svc = setup();
        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();

        let mut extra = quote_line("50");
        extra.order_item_id = None;
        extra.name = "Mounting Kit".to_string();

        let updated = svc
            .update_offer(detail.offer.id, 701, vec![quote_line("290"), extra])
            .unwrap();
        assert_eq!(updated.items.len(), 2);
    }

    #[test]
    fn test_update_blocked_by_foreign_lease() {
        let svc = setup();
        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();
        svc.locks.acquire(detail.offer.id, 999).unwrap();

        let err = svc
            .update_offer(detail.offer.id, 701, vec![quote_line("290")])
            .unwrap_err();
        assert!(matches!(err, MarketError::LockHeld { .. }));
    }

    #[test]
    fn test_update_drops_own_lease() {
        let svc = setup();
        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();
        svc.locks.acquire(detail.offer.id, 701).unwrap();

        let updated = svc
            .update_offer(detail.offer.id, 701, vec![quote_line("290")])
            .unwrap();
        assert_eq!(updated.offer.locked_at, None);
        assert_eq!(updated.offer.locked_by, None);
    }

    #[test]
    fn test_declining_a_winning_line_demotes_it() {
        let svc = setup();
        let detail = svc
            .submit_offer(1, supplier(701, "AutoParts LLC"), vec![quote_line("300")])
            .unwrap();
        let line_id = detail.items[0].id;

        // Promote the line and commit a price onto the order item
        let txn = svc.store.begin_write().unwrap();
        let mut item = svc.store.get_offer_item_txn(&txn, line_id).unwrap().unwrap();
        item.winner = true;
        item.commit_price = Some(Decimal::new(310, 0));
        svc.store.put_offer_item(&txn, &item).unwrap();
        let mut order_item = svc.store.get_order_item_txn(&txn, 100).unwrap().unwrap();
        order_item.commit_price = Some(Decimal::new(310, 0));
        order_item.commit_currency = Some(Currency::Rub);
        svc.store.put_order_item(&txn, &order_item).unwrap();
        txn.commit().unwrap();

        let mut declined = quote_line("0");
        declined.offered_quantity = 0;
        declined.weight_kg = 0.0;
        declined.delivery_days = 0;
        let updated = svc.update_offer(detail.offer.id, 701, vec![declined]).unwrap();

        assert!(!updated.items[0].winner);
        assert_eq!(updated.items[0].commit_price, None);
        let order_item = svc.store.get_order_item(100).unwrap().unwrap();
        assert_eq!(order_item.commit_price, None);
        assert_eq!(order_item.commit_currency, None);
    }
}

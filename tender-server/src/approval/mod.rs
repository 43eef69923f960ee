//! Proposal approval
//!
//! Approval is the transaction that ends a sourcing round: committed
//! prices land on the order items, the order enters `ProposalSent` and
//! every chat thread of the order is archived. All of it commits
//! together or not at all.
//!
//! Items without a winner do not block approval outright; they come
//! back as an [`ApprovalOutcome::IncompleteCoverage`] payload and the
//! caller repeats the request with the override flag after the user
//! confirms.

use shared::error::{MarketError, MarketResult};
use shared::event::MarketEvent;
use shared::order::{ApprovalOutcome, OfferItem, OrderStatus};
use std::collections::HashMap;

use crate::bidding::money;
use crate::chat::ChannelHub;
use crate::store::{EntityStore, StoreError};
use crate::utils::now_millis;

/// Atomic proposal commit
#[derive(Debug, Clone)]
pub struct ApprovalCommitter {
    store: EntityStore,
    hub: ChannelHub,
}

impl ApprovalCommitter {
    pub fn new(store: EntityStore, hub: ChannelHub) -> Self {
        Self { store, hub }
    }

    /// Commit the proposal for an order
    ///
    /// With winners on every item (or `explicit_override` set) this
    /// writes the committed prices, moves the order to `ProposalSent`
    /// and archives the order's chats in one transaction. Otherwise it
    /// returns the names of uncovered items and changes nothing.
    pub fn approve(&self, order_id: u64, explicit_override: bool) -> MarketResult<ApprovalOutcome> {
        let now = now_millis();
        let txn = self.store.begin_write()?;

        // 1. The order must still be in the sourcing phase
        let mut order = self
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
            return Err(MarketError::InvalidTransition {
                from: order.status,
                to: OrderStatus::ProposalSent,
            });
        }

        // 2. Collect the winning quote per order item
        let order_items = self.store.items_for_order_txn(&txn, order_id)?;
        let mut winners: HashMap<u64, OfferItem> = HashMap::new();
        for offer in self.store.offers_for_order_txn(&txn, order_id)? {
            for item in self.store.items_for_offer_txn(&txn, offer.id)? {
                if !item.winner {
                    continue;
                }
                let Some(target) = item.resolve_target(&order_items) else {
                    tracing::warn!(
                        offer_item_id = item.id,
                        "Winner mark on a quote with no matching item, skipping"
                    );
                    continue;
                };
                if let Some(previous) = winners.insert(target, item) {
                    tracing::warn!(
                        order_id,
                        order_item_id = target,
                        dropped_offer_item = previous.id,
                        "Two winner marks on one item, keeping the later quote"
                    );
                }
            }
        }

        // 3. Coverage gate
        let missing: Vec<String> = order_items
            .iter()
            .filter(|item| !winners.contains_key(&item.id))
            .map(|item| item.name.clone())
            .collect();
        if !missing.is_empty() && !explicit_override {
            tracing::info!(order_id, missing = missing.len(), "Approval held for coverage");
            return Ok(ApprovalOutcome::IncompleteCoverage { missing });
        }

        // 4. Commit prices onto the order items
        let winner_count = winners.len();
        for (order_item_id, win) in winners {
            let mut order_item = self
                .store
                .get_order_item_txn(&txn, order_item_id)?
                .ok_or(MarketError::not_found("order_item", order_item_id))?;
            order_item.commit_price =
                Some(win.commit_price.unwrap_or_else(|| money::round_price(win.price)));
            order_item.commit_currency = Some(win.commit_currency.unwrap_or(win.currency));
            self.store.put_order_item(&txn, &order_item)?;
        }

        // 5. Status change and chat archival ride the same transaction
        order.status = OrderStatus::ProposalSent;
        order.status_updated_at = now;
        self.store.put_order(&txn, &order)?;

        let mut archived = 0usize;
        for mut message in self.store.messages_for_order_txn(&txn, order_id)? {
            if !message.archived {
                message.archived = true;
                self.store.put_message(&txn, &message)?;
                archived += 1;
            }
        }

        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::ProposalIssued { order_id });
        self.hub.publish(MarketEvent::StatusChanged {
            order_id,
            status: OrderStatus::ProposalSent,
            at: now,
        });
        tracing::info!(
            order_id,
            winners = winner_count,
            archived_messages = archived,
            "Proposal approved"
        );

        Ok(ApprovalOutcome::Committed {
            order_id,
            winners: winner_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::{BidCollector, EditLockGuard, RankEngine};
    use crate::orders::OrderService;
    use rust_decimal::Decimal;
    use shared::chat::{ChatMessage, ChatRole};
    use shared::order::{
        Currency, OfferItemDraft, OrderDraft, OrderItemDraft, SupplierIdent, WinnerDraft,
    };

    struct Fixture {
        committer: ApprovalCommitter,
        ranking: RankEngine,
        store: EntityStore,
    }

    fn fixture(item_names: &[&str]) -> Fixture {
        let store = EntityStore::open_in_memory().unwrap();
        let hub = ChannelHub::new();
        let locks = EditLockGuard::new(store.clone(), 300);

        let orders = OrderService::new(store.clone(), hub.clone());
        orders
            .create_order(OrderDraft {
                buyer_id: 500,
                buyer_name: "Volga Motors".to_string(),
                buyer_phone: None,
                buyer_email: None,
                location: None,
                deadline: None,
                items: item_names
                    .iter()
                    .map(|name| OrderItemDraft {
                        name: name.to_string(),
                        quantity: 2,
                        brand: None,
                        article: None,
                        uom: None,
                        comment: None,
                    })
                    .collect(),
            })
            .unwrap();

        Fixture {
            committer: ApprovalCommitter::new(store.clone(), hub.clone()),
            ranking: RankEngine::new(store.clone(), hub.clone(), locks.clone()),
            store,
        }
    }

    /// Quote every named item from one supplier, return offer item IDs
    fn quote_items(fx: &Fixture, supplier_id: u64, names: &[&str]) -> Vec<u64> {
        let collector = BidCollector::new(
            fx.store.clone(),
            ChannelHub::new(),
            EditLockGuard::new(fx.store.clone(), 300),
        );
        let detail = collector
            .submit_offer(
                1,
                SupplierIdent {
                    id: supplier_id,
                    name: format!("Supplier {}", supplier_id),
                    phone: None,
                },
                names
                    .iter()
                    .map(|name| OfferItemDraft {
                        order_item_id: None,
                        name: name.to_string(),
                        offered_quantity: 2,
                        price: Decimal::new(100, 0),
                        currency: Currency::Rub,
                        weight_kg: 1.0,
                        delivery_days: 5,
                        supplier_sku: None,
                        comment: None,
                    })
                    .collect(),
            )
            .unwrap();
        detail.items.iter().map(|i| i.id).collect()
    }

    fn seed_message(fx: &Fixture, id: u64) {
        let txn = fx.store.begin_write().unwrap();
        fx.store
            .put_message(
                &txn,
                &ChatMessage {
                    id,
                    order_id: 1,
                    sender_role: ChatRole::Supplier,
                    sender_id: 701,
                    sender_name: "Supplier 701".to_string(),
                    recipient_id: 1,
                    body: "ping".to_string(),
                    attachment_url: None,
                    item_ref: None,
                    read: false,
                    archived: false,
                    created_at: now_millis(),
                    client_msg_id: None,
                },
            )
            .unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_full_coverage_commits_everything() {
        let fx = fixture(&["Item1"]);
        let lines = quote_items(&fx, 701, &["Item1"]);
        fx.ranking
            .toggle_winner(
                1,
                lines[0],
                Some(WinnerDraft {
                    commit_price: Decimal::new(120, 0),
                    commit_currency: Currency::Rub,
                    delivery_rate: None,
                    admin_comment: None,
                    client_delivery_weeks: None,
                }),
                1,
            )
            .unwrap();
        seed_message(&fx, 1);

        let outcome = fx.committer.approve(1, false).unwrap();
        assert!(matches!(
            outcome,
            ApprovalOutcome::Committed {
                order_id: 1,
                winners: 1,
            }
        ));

        let order = fx.store.get_order(1).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::ProposalSent);
        let items = fx.store.items_for_order(1).unwrap();
        assert_eq!(items[0].commit_price, Some(Decimal::new(120, 0)));
        let messages = fx.store.messages_for_order(1).unwrap();
        assert!(messages.iter().all(|m| m.archived));
    }

    #[test]
    fn test_incomplete_coverage_names_items_and_holds() {
        let fx = fixture(&["Item1", "Item2"]);
        let lines = quote_items(&fx, 701, &["Item1"]);
        fx.ranking.toggle_winner(1, lines[0], None, 1).unwrap();
        seed_message(&fx, 1);

        let outcome = fx.committer.approve(1, false).unwrap();
        assert_eq!(
            outcome,
            ApprovalOutcome::IncompleteCoverage {
                missing: vec!["Item2".to_string()],
            }
        );

        // Nothing moved
        let order = fx.store.get_order(1).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(!fx.store.messages_for_order(1).unwrap()[0].archived);

        // The override commits the partial proposal
        let outcome = fx.committer.approve(1, true).unwrap();
        assert!(matches!(
            outcome,
            ApprovalOutcome::Committed {
                order_id: 1,
                winners: 1,
            }
        ));
        let order = fx.store.get_order(1).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::ProposalSent);
    }

    #[test]
    fn test_approve_requires_sourcing_phase() {
        let fx = fixture(&["Item1"]);
        let lines = quote_items(&fx, 701, &["Item1"]);
        fx.ranking.toggle_winner(1, lines[0], None, 1).unwrap();

        fx.committer.approve(1, false).unwrap();
        // Second approval finds the proposal already sent
        let err = fx.committer.approve(1, false).unwrap_err();
        assert!(matches!(
            err,
            MarketError::InvalidTransition {
                from: OrderStatus::ProposalSent,
                to: OrderStatus::ProposalSent,
            }
        ));
    }

    #[test]
    fn test_approve_terminal_order_fails() {
        let fx = fixture(&["Item1"]);
        let txn = fx.store.begin_write().unwrap();
        let mut order = fx.store.get_order_txn(&txn, 1).unwrap().unwrap();
        order.status = OrderStatus::Cancelled;
        fx.store.put_order(&txn, &order).unwrap();
        txn.commit().unwrap();

        assert!(matches!(
            fx.committer.approve(1, false).unwrap_err(),
            MarketError::Terminal { .. }
        ));
    }
}

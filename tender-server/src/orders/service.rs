//! Order intake and editing

use shared::error::{MarketError, MarketResult};
use shared::event::MarketEvent;
use shared::order::{
    OfferDetail, Order, OrderDetail, OrderDraft, OrderItem, OrderItemEdit, OrderMetadataEdit,
    OrderStatus,
};

use crate::chat::ChannelHub;
use crate::store::{EntityStore, StoreError};
use crate::utils::now_millis;

/// Hard cap on one listing page
const MAX_PAGE_SIZE: usize = 200;

/// Order intake, lookup and editing
#[derive(Debug, Clone)]
pub struct OrderService {
    store: EntityStore,
    hub: ChannelHub,
}

impl OrderService {
    pub fn new(store: EntityStore, hub: ChannelHub) -> Self {
        Self { store, hub }
    }

    /// Register a new order with its requested items
    ///
    /// The order enters the pipeline as `Processing` with bidding not
    /// yet started; the first incoming offer flips the flag.
    pub fn create_order(&self, draft: OrderDraft) -> MarketResult<OrderDetail> {
        // 1. Validate before touching storage
        if draft.buyer_name.trim().is_empty() {
            return Err(MarketError::validation("buyer_name", "buyer name must not be empty"));
        }
        if draft.items.is_empty() {
            return Err(MarketError::validation(
                "items",
                "an order needs at least one item",
            ));
        }
        for item in &draft.items {
            if item.name.trim().is_empty() {
                return Err(MarketError::validation("name", "item name must not be empty"));
            }
            if item.quantity == 0 {
                return Err(MarketError::validation(
                    &item.name,
                    "quantity must be at least 1",
                ));
            }
        }

        // 2. Persist order and items in one transaction
        let now = now_millis();
        let txn = self.store.begin_write()?;
        let order_id = self.store.next_order_id(&txn)?;
        let order = Order {
            id: order_id,
            buyer_id: draft.buyer_id,
            buyer_name: draft.buyer_name,
            buyer_phone: draft.buyer_phone,
            buyer_email: draft.buyer_email,
            location: draft.location,
            status: OrderStatus::Processing,
            bidding_started: false,
            refusal_reason: None,
            deadline: draft.deadline,
            created_at: now,
            status_updated_at: now,
        };
        self.store.put_order(&txn, &order)?;

        let mut items = Vec::with_capacity(draft.items.len());
        for item_draft in draft.items {
            let item = OrderItem {
                id: self.store.next_entity_id(&txn)?,
                order_id,
                name: item_draft.name,
                quantity: item_draft.quantity,
                brand: item_draft.brand,
                article: item_draft.article,
                uom: item_draft.uom,
                comment: item_draft.comment,
                commit_price: None,
                commit_currency: None,
            };
            self.store.put_order_item(&txn, &item)?;
            items.push(item);
        }
        txn.commit().map_err(StoreError::from)?;

        // 3. Broadcast after commit
        self.hub.publish(MarketEvent::OrderCreated { order_id, at: now });
        tracing::info!(order_id, item_count = items.len(), buyer = %order.buyer_name, "Order created");

        Ok(OrderDetail {
            order,
            items,
            offers: Vec::new(),
        })
    }

    /// Full order view: header, items and every offer with its lines
    pub fn get_order(&self, order_id: u64) -> MarketResult<OrderDetail> {
        let order = self
            .store
            .get_order(order_id)?
            .ok_or(MarketError::not_found("order", order_id))?;
        let items = self.store.items_for_order(order_id)?;
        let mut offers = Vec::new();
        for offer in self.store.offers_for_order(order_id)? {
            let offer_items = self.store.items_for_offer(offer.id)?;
            offers.push(OfferDetail {
                offer,
                items: offer_items,
            });
        }
        Ok(OrderDetail {
            order,
            items,
            offers,
        })
    }

    /// Page through order headers, newest first
    pub fn list_orders(&self, limit: usize, offset: usize) -> MarketResult<Vec<Order>> {
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        Ok(self.store.list_orders(limit, offset)?)
    }

    /// Apply sparse edits to requested items
    ///
    /// Commit fields are not reachable from here; they change only
    /// through winner selection and approval.
    pub fn update_order_items(
        &self,
        order_id: u64,
        edits: Vec<OrderItemEdit>,
    ) -> MarketResult<Vec<OrderItem>> {
        let txn = self.store.begin_write()?;
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

        for edit in edits {
            let mut item = self
                .store
                .get_order_item_txn(&txn, edit.id)?
                .filter(|item| item.order_id == order_id)
                .ok_or(MarketError::not_found("order_item", edit.id))?;

            if let Some(name) = edit.name {
                if name.trim().is_empty() {
                    return Err(MarketError::validation("name", "item name must not be empty"));
                }
                item.name = name;
            }
            if let Some(quantity) = edit.quantity {
                if quantity == 0 {
                    return Err(MarketError::validation(
                        &item.name,
                        "quantity must be at least 1",
                    ));
                }
                item.quantity = quantity;
            }
            if let Some(brand) = edit.brand {
                item.brand = Some(brand);
            }
            if let Some(article) = edit.article {
                item.article = Some(article);
            }
            if let Some(uom) = edit.uom {
                item.uom = Some(uom);
            }
            if let Some(comment) = edit.comment {
                item.comment = Some(comment);
            }
            self.store.put_order_item(&txn, &item)?;
        }
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::OrderUpdated { order_id });
        Ok(self.store.items_for_order(order_id)?)
    }

    /// Apply sparse edits to the order header contact fields
    pub fn update_order_metadata(
        &self,
        order_id: u64,
        edit: OrderMetadataEdit,
    ) -> MarketResult<Order> {
        let txn = self.store.begin_write()?;
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

        if let Some(buyer_name) = edit.buyer_name {
            if buyer_name.trim().is_empty() {
                return Err(MarketError::validation(
                    "buyer_name",
                    "buyer name must not be empty",
                ));
            }
            order.buyer_name = buyer_name;
        }
        if let Some(buyer_phone) = edit.buyer_phone {
            order.buyer_phone = Some(buyer_phone);
        }
        if let Some(buyer_email) = edit.buyer_email {
            order.buyer_email = Some(buyer_email);
        }
        if let Some(location) = edit.location {
            order.location = Some(location);
        }
        if let Some(deadline) = edit.deadline {
            order.deadline = Some(deadline);
        }
        self.store.put_order(&txn, &order)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::OrderUpdated { order_id });
        Ok(order)
    }
}

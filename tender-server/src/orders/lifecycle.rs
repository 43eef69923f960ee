//! Order status transitions
//!
//! The status chain is linear; `advance` only ever moves one step
//! forward and refuses the `ProposalSent` edge, which belongs to the
//! approval flow alone. Terminal orders never change status again.

use shared::actor::{ActorRole, AdminCapability};
use shared::error::{MarketError, MarketResult};
use shared::event::MarketEvent;
use shared::order::{Order, OrderStatus};

use crate::chat::ChannelHub;
use crate::store::{EntityStore, StoreError};
use crate::utils::now_millis;

/// Status transitions along the canonical chain
#[derive(Debug, Clone)]
pub struct LifecycleService {
    store: EntityStore,
    hub: ChannelHub,
}

impl LifecycleService {
    pub fn new(store: EntityStore, hub: ChannelHub) -> Self {
        Self { store, hub }
    }

    /// Move the order one step along the chain
    ///
    /// The step into `ProposalSent` is refused here; only a successful
    /// approval enters that status.
    pub fn advance(&self, order_id: u64) -> MarketResult<Order> {
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

        let next = order.status.next().ok_or(MarketError::InvalidTransition {
            from: order.status,
            to: order.status,
        })?;
        if next.is_approval_gate() {
            return Err(MarketError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }

        let now = now_millis();
        let order = self.apply_status(&txn, order, next, now)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::StatusChanged {
            order_id,
            status: next,
            at: now,
        });
        tracing::info!(order_id, status = %next, "Order advanced");
        Ok(order)
    }

    /// Branch a fresh order into manual processing
    pub fn mark_manual(&self, order_id: u64) -> MarketResult<Order> {
        let txn = self.store.begin_write()?;
        let order = self
            .store
            .get_order_txn(&txn, order_id)?
            .ok_or(MarketError::not_found("order", order_id))?;
        if order.status != OrderStatus::Processing {
            return Err(MarketError::InvalidTransition {
                from: order.status,
                to: OrderStatus::ManualProcessing,
            });
        }

        let now = now_millis();
        let order = self.apply_status(&txn, order, OrderStatus::ManualProcessing, now)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::StatusChanged {
            order_id,
            status: OrderStatus::ManualProcessing,
            at: now,
        });
        Ok(order)
    }

    /// Set an arbitrary status, skipping chain checks
    ///
    /// Back-office repair tool; requires an [`AdminCapability`]. The
    /// one rule that still holds: terminal orders stay terminal.
    pub fn force_set(
        &self,
        order_id: u64,
        target: OrderStatus,
        _capability: AdminCapability,
    ) -> MarketResult<Order> {
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

        let from = order.status;
        let now = now_millis();
        let order = self.apply_status(&txn, order, target, now)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::StatusChanged {
            order_id,
            status: target,
            at: now,
        });
        tracing::info!(order_id, from = %from, to = %target, "Order status forced");
        Ok(order)
    }

    /// Close the order before completion
    ///
    /// Who refuses decides where it lands: the desk cancels
    /// (`Cancelled`), the buyer walks away (`Refused`). Suppliers
    /// decline single items inside their offers instead.
    pub fn refuse(
        &self,
        order_id: u64,
        reason: Option<String>,
        role: ActorRole,
    ) -> MarketResult<Order> {
        let target = match role {
            ActorRole::Admin | ActorRole::Operator => OrderStatus::Cancelled,
            ActorRole::Buyer => OrderStatus::Refused,
            ActorRole::Supplier => {
                return Err(MarketError::validation(
                    "role",
                    "suppliers decline items, not whole orders",
                ));
            }
        };

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

        order.refusal_reason = reason.filter(|r| !r.trim().is_empty());
        let now = now_millis();
        let order = self.apply_status(&txn, order, target, now)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::StatusChanged {
            order_id,
            status: target,
            at: now,
        });
        tracing::info!(order_id, status = %target, by = %role, "Order refused");
        Ok(order)
    }

    fn apply_status(
        &self,
        txn: &redb::WriteTransaction,
        mut order: Order,
        target: OrderStatus,
        now: i64,
    ) -> MarketResult<Order> {
        order.status = target;
        order.status_updated_at = now;
        self.store.put_order(txn, &order)?;
        Ok(order)
    }
}

//! Advisory edit leases on offers
//!
//! A supplier opening an offer for editing takes a lease; the desk UI
//! shows the offer as locked while the lease is live. Leases expire
//! after a TTL without renewal, so a closed laptop never wedges an
//! offer. Nothing is enforced at read time: the lease only gates
//! writes that go through the bidding services.

use shared::error::{MarketError, MarketResult};
use shared::order::Offer;

use crate::store::EntityStore;
use crate::utils::now_millis;

/// Default lease TTL in seconds
pub const EDIT_LOCK_TIMEOUT_SECS: u64 = 300;

/// Lease manager for offer editing
#[derive(Debug, Clone)]
pub struct EditLockGuard {
    store: EntityStore,
    ttl_ms: i64,
}

impl EditLockGuard {
    pub fn new(store: EntityStore, ttl_secs: u64) -> Self {
        Self {
            store,
            ttl_ms: (ttl_secs as i64) * 1000,
        }
    }

    /// Whether a lease taken at `locked_at` is still live at `now_ms`
    pub fn is_locked(offer: &Offer, now_ms: i64, ttl_ms: i64) -> bool {
        matches!(offer.locked_at, Some(at) if now_ms - at < ttl_ms)
    }

    /// Seconds left on a live lease held by someone other than `actor_id`
    ///
    /// `None` means the offer is free for this actor: unlocked, expired,
    /// or held by the actor itself.
    pub fn held_by_other(&self, offer: &Offer, actor_id: u64, now_ms: i64) -> Option<i64> {
        if !Self::is_locked(offer, now_ms, self.ttl_ms) {
            return None;
        }
        if offer.locked_by == Some(actor_id) {
            return None;
        }
        let at = offer.locked_at?;
        let remaining_ms = self.ttl_ms - (now_ms - at);
        Some((remaining_ms + 999) / 1000)
    }

    /// Take or refresh the lease on an offer
    ///
    /// Re-acquiring an own live lease refreshes it. An expired lease is
    /// taken over silently from the previous holder.
    pub fn acquire(&self, offer_id: u64, actor_id: u64) -> MarketResult<Offer> {
        let now = now_millis();
        let txn = self.store.begin_write()?;
        let mut offer = self
            .store
            .get_offer_txn(&txn, offer_id)?
            .ok_or(MarketError::not_found("offer", offer_id))?;

        if let Some(remaining_secs) = self.held_by_other(&offer, actor_id, now) {
            return Err(MarketError::LockHeld {
                offer_id,
                remaining_secs,
            });
        }
        if !Self::is_locked(&offer, now, self.ttl_ms)
            && let Some(previous) = offer.locked_by
            && previous != actor_id
        {
            tracing::warn!(
                offer_id,
                previous_holder = previous,
                new_holder = actor_id,
                "Expired edit lease taken over"
            );
        }

        offer.locked_at = Some(now);
        offer.locked_by = Some(actor_id);
        self.store.put_offer(&txn, &offer)?;
        txn.commit().map_err(crate::store::StoreError::from)?;

        tracing::debug!(offer_id, actor_id, "Edit lease acquired");
        Ok(offer)
    }

    /// Heartbeat an existing lease
    ///
    /// Fails with `LeaseExpired` when the caller no longer holds a live
    /// lease; the client must re-acquire and refetch before continuing.
    pub fn renew(&self, offer_id: u64, actor_id: u64) -> MarketResult<Offer> {
        let now = now_millis();
        let txn = self.store.begin_write()?;
        let mut offer = self
            .store
            .get_offer_txn(&txn, offer_id)?
            .ok_or(MarketError::not_found("offer", offer_id))?;

        if offer.locked_by != Some(actor_id) || !Self::is_locked(&offer, now, self.ttl_ms) {
            return Err(MarketError::LeaseExpired(offer_id));
        }

        offer.locked_at = Some(now);
        self.store.put_offer(&txn, &offer)?;
        txn.commit().map_err(crate::store::StoreError::from)?;
        Ok(offer)
    }

    /// Drop the caller's lease, if any
    ///
    /// Idempotent: releasing an unheld or foreign lease is a no-op, so
    /// a client may always release on navigation without first checking
    /// who holds the lock.
    pub fn release(&self, offer_id: u64, actor_id: u64) -> MarketResult<()> {
        let txn = self.store.begin_write()?;
        let mut offer = self
            .store
            .get_offer_txn(&txn, offer_id)?
            .ok_or(MarketError::not_found("offer", offer_id))?;

        if offer.locked_by != Some(actor_id) {
            return Ok(());
        }

        offer.locked_at = None;
        offer.locked_by = None;
        self.store.put_offer(&txn, &offer)?;
        txn.commit().map_err(crate::store::StoreError::from)?;

        tracing::debug!(offer_id, actor_id, "Edit lease released");
        Ok(())
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }
}

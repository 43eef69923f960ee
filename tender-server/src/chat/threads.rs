//! Negotiation chat threads
//!
//! Threads are derived, not stored: a thread is the set of an order's
//! messages whose non-admin end is one counterparty. Sending into an
//! archived thread revives the whole thread; approval archives every
//! thread of the order (see the approval module).
//!
//! Unread accounting is directional. A message counts as unread only
//! for the account it is directed at, and archived messages stop
//! counting until the thread is revived.

use std::collections::BTreeMap;

use shared::chat::{ChatMessage, ChatRole, SendMessage, ThreadSummary};
use shared::error::{MarketError, MarketResult};
use shared::event::MarketEvent;

use crate::chat::ChannelHub;
use crate::store::{EntityStore, StoreError};
use crate::utils::now_millis;

/// Chat persistence and thread bookkeeping
#[derive(Debug, Clone)]
pub struct ChatThreadManager {
    store: EntityStore,
    hub: ChannelHub,
}

impl ChatThreadManager {
    pub fn new(store: EntityStore, hub: ChannelHub) -> Self {
        Self { store, hub }
    }

    /// Persist a message and revive its thread
    ///
    /// The message ID comes from the global sequence, so ordering is
    /// stable across orders. If any message of the thread was archived,
    /// the whole thread comes back.
    pub fn send(&self, input: SendMessage) -> MarketResult<ChatMessage> {
        if input.body.trim().is_empty() && input.attachment_url.is_none() {
            return Err(MarketError::validation(
                "body",
                "a message needs text or an attachment",
            ));
        }

        let txn = self.store.begin_write()?;
        self.store
            .get_order_txn(&txn, input.order_id)?
            .ok_or(MarketError::not_found("order", input.order_id))?;

        let message = ChatMessage {
            id: self.store.next_message_id(&txn)?,
            order_id: input.order_id,
            sender_role: input.sender_role,
            sender_id: input.sender_id,
            sender_name: input.sender_name,
            recipient_id: input.recipient_id,
            body: input.body,
            attachment_url: input.attachment_url,
            item_ref: input.item_ref,
            read: false,
            archived: false,
            created_at: now_millis(),
            client_msg_id: input.client_msg_id,
        };

        // Revive the thread before the new message joins it
        let counterparty_id = message.counterparty_id();
        for mut old in self.store.messages_for_order_txn(&txn, message.order_id)? {
            if old.in_thread(message.order_id, counterparty_id) && old.archived {
                old.archived = false;
                self.store.put_message(&txn, &old)?;
            }
        }

        self.store.put_message(&txn, &message)?;
        txn.commit().map_err(StoreError::from)?;

        self.hub.publish(MarketEvent::ChatPosted {
            order_id: message.order_id,
            message: message.clone(),
        });
        tracing::debug!(
            order_id = message.order_id,
            message_id = message.id,
            counterparty_id,
            "Chat message stored"
        );
        Ok(message)
    }

    /// Messages of one thread, oldest first
    pub fn messages(&self, order_id: u64, counterparty_id: u64) -> MarketResult<Vec<ChatMessage>> {
        let messages = self
            .store
            .messages_for_order(order_id)?
            .into_iter()
            .filter(|m| m.in_thread(order_id, counterparty_id))
            .collect();
        Ok(messages)
    }

    /// Mark the thread's messages directed at `reader_id` as read
    ///
    /// Returns how many messages changed. Messages the reader sent
    /// stay untouched; read receipts never travel backwards.
    pub fn mark_read(
        &self,
        order_id: u64,
        counterparty_id: u64,
        reader_id: u64,
    ) -> MarketResult<u64> {
        let txn = self.store.begin_write()?;
        let mut changed = 0u64;
        for mut message in self.store.messages_for_order_txn(&txn, order_id)? {
            if message.in_thread(order_id, counterparty_id)
                && message.recipient_id == reader_id
                && !message.read
            {
                message.read = true;
                self.store.put_message(&txn, &message)?;
                changed += 1;
            }
        }
        txn.commit().map_err(StoreError::from)?;

        if changed > 0 {
            self.hub.publish(MarketEvent::ThreadRead {
                order_id,
                counterparty_id,
                reader_id,
            });
        }
        Ok(changed)
    }

    /// Archive or revive a whole thread by hand
    pub fn archive_thread(
        &self,
        order_id: u64,
        counterparty_id: u64,
        archived: bool,
    ) -> MarketResult<u64> {
        let txn = self.store.begin_write()?;
        let mut changed = 0u64;
        for mut message in self.store.messages_for_order_txn(&txn, order_id)? {
            if message.in_thread(order_id, counterparty_id) && message.archived != archived {
                message.archived = archived;
                self.store.put_message(&txn, &message)?;
                changed += 1;
            }
        }
        txn.commit().map_err(StoreError::from)?;

        if changed > 0 {
            self.hub.publish(MarketEvent::ThreadArchived {
                order_id,
                counterparty_id,
                archived,
            });
        }
        Ok(changed)
    }

    /// Thread overview for one reader
    ///
    /// Admin readers see every thread; other readers only the threads
    /// they are the counterparty of. Threads with unread messages sort
    /// first, newest activity next. Archived threads are hidden unless
    /// asked for.
    pub fn list_threads(
        &self,
        reader_id: u64,
        reader_role: ChatRole,
        include_archived: bool,
    ) -> MarketResult<Vec<ThreadSummary>> {
        let mut groups: BTreeMap<(u64, u64), Vec<ChatMessage>> = BTreeMap::new();
        for message in self.store.all_messages()? {
            let key = (message.order_id, message.counterparty_id());
            groups.entry(key).or_default().push(message);
        }

        let mut threads = Vec::new();
        for ((order_id, counterparty_id), messages) in groups {
            if reader_role != ChatRole::Admin && counterparty_id != reader_id {
                continue;
            }
            let archived = messages.iter().all(|m| m.archived);
            if archived && !include_archived {
                continue;
            }

            // all_messages is ascending by ID, so the last one is newest
            let last = match messages.last() {
                Some(last) => last,
                None => continue,
            };
            let unread = messages
                .iter()
                .filter(|m| m.recipient_id == reader_id && !m.read && !m.archived)
                .count() as u64;
            let (counterparty_name, counterparty_role) =
                self.resolve_counterparty(order_id, counterparty_id, &messages)?;

            threads.push(ThreadSummary {
                order_id,
                counterparty_id,
                counterparty_name,
                counterparty_role,
                last_message: last.body.clone(),
                last_message_at: last.created_at,
                unread,
                archived,
            });
        }

        threads.sort_by(|a, b| {
            (b.unread > 0)
                .cmp(&(a.unread > 0))
                .then(b.last_message_at.cmp(&a.last_message_at))
        });
        Ok(threads)
    }

    /// Unread badge across all threads, best-effort
    ///
    /// A storage hiccup degrades to zero instead of failing the caller;
    /// the badge is cosmetic.
    pub fn unread_total(&self, reader_id: u64) -> u64 {
        match self.store.all_messages() {
            Ok(messages) => messages
                .iter()
                .filter(|m| m.recipient_id == reader_id && !m.read && !m.archived)
                .count() as u64,
            Err(e) => {
                tracing::warn!(error = %e, "Unread count unavailable");
                0
            }
        }
    }

    /// Name and role of a thread counterparty
    ///
    /// Preference order: what they called themselves in their last
    /// message, then the order's buyer record, then the supplier record
    /// of their offer.
    fn resolve_counterparty(
        &self,
        order_id: u64,
        counterparty_id: u64,
        messages: &[ChatMessage],
    ) -> MarketResult<(String, ChatRole)> {
        if let Some(theirs) = messages.iter().rev().find(|m| m.sender_id == counterparty_id) {
            return Ok((theirs.sender_name.clone(), theirs.sender_role));
        }
        if let Some(order) = self.store.get_order(order_id)?
            && order.buyer_id == counterparty_id
        {
            return Ok((order.buyer_name, ChatRole::Buyer));
        }
        if let Some(offer) = self
            .store
            .offers_for_order(order_id)?
            .into_iter()
            .find(|o| o.supplier_id == counterparty_id)
        {
            return Ok((offer.supplier_name, ChatRole::Supplier));
        }
        Ok((format!("Participant {}", counterparty_id), ChatRole::Supplier))
    }
}

//! Thread list kept fresh between polls
//!
//! The server's `list_threads` snapshot is authoritative; pushed
//! events only refine the picture until the next poll. A reader that
//! misses events (lagged channel, reconnect) converges as soon as one
//! snapshot arrives.

use std::collections::BTreeMap;

use shared::chat::{ChatRole, ThreadSummary};
use shared::event::MarketEvent;

/// Reader-side view over the thread list
#[derive(Debug, Clone)]
pub struct ThreadPoller {
    reader_id: u64,
    /// Keyed by `(order_id, counterparty_id)`
    threads: BTreeMap<(u64, u64), ThreadSummary>,
}

impl ThreadPoller {
    pub fn new(reader_id: u64) -> Self {
        Self {
            reader_id,
            threads: BTreeMap::new(),
        }
    }

    /// Replace local state with a polled snapshot (server truth)
    pub fn apply_snapshot(&mut self, snapshot: Vec<ThreadSummary>) {
        self.threads = snapshot
            .into_iter()
            .map(|thread| ((thread.order_id, thread.counterparty_id), thread))
            .collect();
    }

    /// Fold one pushed event in
    ///
    /// Events refine known threads, or create a provisional entry when
    /// a message is addressed to this reader; the next snapshot
    /// corrects any divergence.
    pub fn apply_event(&mut self, event: &MarketEvent) {
        match event {
            MarketEvent::ChatPosted { order_id, message } => {
                let key = (*order_id, message.counterparty_id());
                let unread_for_reader =
                    message.recipient_id == self.reader_id && message.sender_id != self.reader_id;

                if let Some(thread) = self.threads.get_mut(&key) {
                    thread.last_message = message.body.clone();
                    thread.last_message_at = message.created_at;
                    // Sending into an archived thread revives it
                    thread.archived = false;
                    if unread_for_reader {
                        thread.unread += 1;
                    }
                } else if unread_for_reader {
                    self.threads.insert(
                        key,
                        provisional_thread(*order_id, message),
                    );
                }
            }
            MarketEvent::ThreadRead {
                order_id,
                counterparty_id,
                reader_id,
            } => {
                // Another device of the same reader caught up
                if *reader_id == self.reader_id
                    && let Some(thread) = self.threads.get_mut(&(*order_id, *counterparty_id))
                {
                    thread.unread = 0;
                }
            }
            MarketEvent::ThreadArchived {
                order_id,
                counterparty_id,
                archived,
            } => {
                if let Some(thread) = self.threads.get_mut(&(*order_id, *counterparty_id)) {
                    thread.archived = *archived;
                }
            }
            // Approval archives every thread of the order
            MarketEvent::ProposalIssued { order_id } => {
                for thread in self.threads.values_mut() {
                    if thread.order_id == *order_id {
                        thread.archived = true;
                    }
                }
            }
            _ => {}
        }
    }

    /// Threads to render: unread first, then most recent activity
    pub fn threads(&self, include_archived: bool) -> Vec<ThreadSummary> {
        let mut threads: Vec<ThreadSummary> = self
            .threads
            .values()
            .filter(|thread| include_archived || !thread.archived)
            .cloned()
            .collect();
        threads.sort_by(|a, b| {
            (b.unread > 0)
                .cmp(&(a.unread > 0))
                .then(b.last_message_at.cmp(&a.last_message_at))
        });
        threads
    }

    /// Unread total across live threads (archived threads are muted)
    pub fn total_unread(&self) -> u64 {
        self.threads
            .values()
            .filter(|thread| !thread.archived)
            .map(|thread| thread.unread)
            .sum()
    }
}

fn provisional_thread(order_id: u64, message: &shared::chat::ChatMessage) -> ThreadSummary {
    // Name the counterparty from the message when it is the sender;
    // the next snapshot fills in the real record
    let (counterparty_name, counterparty_role) = if message.sender_role != ChatRole::Admin {
        (message.sender_name.clone(), message.sender_role)
    } else {
        (
            format!("Participant {}", message.counterparty_id()),
            ChatRole::Supplier,
        )
    };

    ThreadSummary {
        order_id,
        counterparty_id: message.counterparty_id(),
        counterparty_name,
        counterparty_role,
        last_message: message.body.clone(),
        last_message_at: message.created_at,
        unread: 1,
        archived: false,
    }
}

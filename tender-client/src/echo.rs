//! Optimistic local echo for one chat thread
//!
//! A sent message shows up in the feed immediately as a pending echo;
//! the server confirmation later replaces it. Matching prefers the
//! idempotency key carried in `client_msg_id` and falls back to
//! (body, sender, time) proximity when the key did not round-trip.
//! Confirmed messages merge by their stable server ID, so duplicate
//! and out-of-order deliveries from push and poll are harmless.

use shared::chat::{ChatMessage, SendMessage};
use uuid::Uuid;

/// How far apart an echo and its confirmation may be and still match
pub const ECHO_MATCH_WINDOW_MS: i64 = 30_000;

/// One renderable row of the feed
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEntry {
    /// Server-confirmed message
    Confirmed(ChatMessage),
    /// Local echo awaiting confirmation
    Pending {
        client_msg_id: Uuid,
        draft: SendMessage,
        queued_at: i64,
    },
}

/// What [`ChatFeed::reconcile`] did with a confirmed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciled {
    /// New message inserted in ID order
    Inserted,
    /// An already-known ID was refreshed in place (duplicate delivery)
    Refreshed,
    /// A pending echo was replaced by its confirmation
    EchoConfirmed,
    /// The message belongs to another thread and was ignored
    ForeignThread,
}

#[derive(Debug, Clone)]
struct PendingEcho {
    client_msg_id: Uuid,
    draft: SendMessage,
    queued_at: i64,
}

/// Ordered message view of one thread with optimistic local echoes
///
/// ```ignore
/// let mut feed = ChatFeed::new(order_id, buyer_id);
/// let key = feed.push_pending(draft.clone());
/// // ... POST the draft (carrying `key` as client_msg_id) ...
/// feed.reconcile(confirmed_from_server);
/// ```
#[derive(Debug, Clone)]
pub struct ChatFeed {
    order_id: u64,
    counterparty_id: u64,
    /// Ascending by server ID
    confirmed: Vec<ChatMessage>,
    pending: Vec<PendingEcho>,
}

impl ChatFeed {
    pub fn new(order_id: u64, counterparty_id: u64) -> Self {
        Self {
            order_id,
            counterparty_id,
            confirmed: Vec::new(),
            pending: Vec::new(),
        }
    }

    /// Show a just-sent draft immediately, before the server confirms
    ///
    /// Returns the idempotency key; send the draft with this key as
    /// its `client_msg_id` so the confirmation replaces the echo
    /// exactly. A draft that already carries a key keeps it.
    pub fn push_pending(&mut self, draft: SendMessage) -> Uuid {
        self.push_pending_at(draft, chrono::Utc::now().timestamp_millis())
    }

    fn push_pending_at(&mut self, mut draft: SendMessage, queued_at: i64) -> Uuid {
        let client_msg_id = *draft.client_msg_id.get_or_insert_with(Uuid::new_v4);
        self.pending.push(PendingEcho {
            client_msg_id,
            draft,
            queued_at,
        });
        client_msg_id
    }

    /// Drop an echo whose send failed, so the UI can offer a retry
    pub fn fail_pending(&mut self, client_msg_id: Uuid) -> bool {
        let before = self.pending.len();
        self.pending.retain(|echo| echo.client_msg_id != client_msg_id);
        self.pending.len() < before
    }

    /// Fold one server-confirmed message into the feed
    pub fn reconcile(&mut self, message: ChatMessage) -> Reconciled {
        if !message.in_thread(self.order_id, self.counterparty_id) {
            return Reconciled::ForeignThread;
        }

        // Duplicate delivery: refresh in place, leave echoes alone
        if let Ok(idx) = self.confirmed.binary_search_by_key(&message.id, |m| m.id) {
            self.confirmed[idx] = message;
            return Reconciled::Refreshed;
        }

        // Key match first, then (body, sender, time) proximity
        let echo_idx = self
            .pending
            .iter()
            .position(|echo| message.client_msg_id == Some(echo.client_msg_id))
            .or_else(|| {
                self.pending.iter().position(|echo| {
                    echo.draft.body == message.body
                        && echo.draft.sender_id == message.sender_id
                        && (message.created_at - echo.queued_at).abs() <= ECHO_MATCH_WINDOW_MS
                })
            });
        let confirmed_echo = echo_idx.is_some();
        if let Some(idx) = echo_idx {
            self.pending.remove(idx);
        }

        match self.confirmed.binary_search_by_key(&message.id, |m| m.id) {
            // Unreachable: the duplicate case returned above
            Ok(idx) => {
                self.confirmed[idx] = message;
                Reconciled::Refreshed
            }
            Err(idx) => {
                self.confirmed.insert(idx, message);
                if confirmed_echo {
                    Reconciled::EchoConfirmed
                } else {
                    Reconciled::Inserted
                }
            }
        }
    }

    /// Fold a polled history snapshot in; returns how many messages
    /// were new
    pub fn merge_snapshot(&mut self, messages: Vec<ChatMessage>) -> usize {
        let mut inserted = 0;
        for message in messages {
            if matches!(
                self.reconcile(message),
                Reconciled::Inserted | Reconciled::EchoConfirmed
            ) {
                inserted += 1;
            }
        }
        inserted
    }

    /// Everything to render: confirmed messages in ID order, then
    /// pending echoes in send order
    pub fn entries(&self) -> Vec<FeedEntry> {
        let mut entries: Vec<FeedEntry> = self
            .confirmed
            .iter()
            .cloned()
            .map(FeedEntry::Confirmed)
            .collect();
        entries.extend(self.pending.iter().map(|echo| FeedEntry::Pending {
            client_msg_id: echo.client_msg_id,
            draft: echo.draft.clone(),
            queued_at: echo.queued_at,
        }));
        entries
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn confirmed_count(&self) -> usize {
        self.confirmed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::chat::ChatRole;

    const ORDER: u64 = 1;
    const BUYER: u64 = 5;
    const ADMIN: u64 = 9;

    fn draft(body: &str) -> SendMessage {
        SendMessage {
            order_id: ORDER,
            sender_role: ChatRole::Buyer,
            sender_id: BUYER,
            sender_name: "Dana".to_string(),
            recipient_id: ADMIN,
            body: body.to_string(),
            attachment_url: None,
            item_ref: None,
            client_msg_id: None,
        }
    }

    fn confirmed(id: u64, body: &str, created_at: i64, key: Option<Uuid>) -> ChatMessage {
        ChatMessage {
            id,
            order_id: ORDER,
            sender_role: ChatRole::Buyer,
            sender_id: BUYER,
            sender_name: "Dana".to_string(),
            recipient_id: ADMIN,
            body: body.to_string(),
            attachment_url: None,
            item_ref: None,
            read: false,
            archived: false,
            created_at,
            client_msg_id: key,
        }
    }

    #[test]
    fn test_echo_replaced_by_key_match() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        let key = feed.push_pending_at(draft("hello"), 1_000);
        assert_eq!(feed.pending_count(), 1);

        let outcome = feed.reconcile(confirmed(10, "hello", 1_200, Some(key)));
        assert_eq!(outcome, Reconciled::EchoConfirmed);
        assert_eq!(feed.pending_count(), 0);
        assert_eq!(feed.confirmed_count(), 1);
    }

    #[test]
    fn test_echo_replaced_by_proximity_when_key_missing() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        feed.push_pending_at(draft("hello"), 1_000);

        // Confirmation lost the key but lands inside the window
        let outcome = feed.reconcile(confirmed(10, "hello", 20_000, None));
        assert_eq!(outcome, Reconciled::EchoConfirmed);
        assert_eq!(feed.pending_count(), 0);
    }

    #[test]
    fn test_proximity_match_respects_window() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        feed.push_pending_at(draft("hello"), 1_000);

        let outcome = feed.reconcile(confirmed(10, "hello", 1_000 + ECHO_MATCH_WINDOW_MS + 1, None));
        assert_eq!(outcome, Reconciled::Inserted);
        // The echo stays pending; it was not this confirmation
        assert_eq!(feed.pending_count(), 1);
        assert_eq!(feed.confirmed_count(), 1);
    }

    #[test]
    fn test_duplicate_delivery_is_idempotent() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        assert_eq!(feed.reconcile(confirmed(10, "hi", 1_000, None)), Reconciled::Inserted);
        assert_eq!(feed.reconcile(confirmed(10, "hi", 1_000, None)), Reconciled::Refreshed);
        assert_eq!(feed.confirmed_count(), 1);
    }

    #[test]
    fn test_duplicate_delivery_does_not_eat_a_second_echo() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        let key = feed.push_pending_at(draft("ok"), 1_000);
        // Same text sent twice in a row
        feed.push_pending_at(draft("ok"), 1_100);

        feed.reconcile(confirmed(10, "ok", 1_050, Some(key)));
        // Duplicate push of the first confirmation
        feed.reconcile(confirmed(10, "ok", 1_050, Some(key)));
        // The second echo still waits for its own confirmation
        assert_eq!(feed.pending_count(), 1);
    }

    #[test]
    fn test_out_of_order_ids_sort_by_id() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        feed.reconcile(confirmed(7, "second", 2_000, None));
        feed.reconcile(confirmed(3, "first", 1_000, None));

        let ids: Vec<u64> = feed
            .entries()
            .iter()
            .map(|entry| match entry {
                FeedEntry::Confirmed(m) => m.id,
                FeedEntry::Pending { .. } => panic!("no echoes here"),
            })
            .collect();
        assert_eq!(ids, vec![3, 7]);
    }

    #[test]
    fn test_foreign_thread_ignored() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        let mut other = confirmed(10, "hello", 1_000, None);
        other.sender_id = 777; // different counterparty
        assert_eq!(feed.reconcile(other), Reconciled::ForeignThread);
        assert_eq!(feed.confirmed_count(), 0);
    }

    #[test]
    fn test_snapshot_and_push_merge_cleanly() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        // Push delivery arrives first
        feed.reconcile(confirmed(11, "pushed", 2_000, None));

        // Poll returns overlapping history
        let new = feed.merge_snapshot(vec![
            confirmed(10, "older", 1_000, None),
            confirmed(11, "pushed", 2_000, None),
            confirmed(12, "newer", 3_000, None),
        ]);
        assert_eq!(new, 2);
        assert_eq!(feed.confirmed_count(), 3);
    }

    #[test]
    fn test_failed_send_clears_echo() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        let key = feed.push_pending_at(draft("doomed"), 1_000);
        assert!(feed.fail_pending(key));
        assert!(!feed.fail_pending(key));
        assert_eq!(feed.pending_count(), 0);
    }

    #[test]
    fn test_entries_order_confirmed_then_pending() {
        let mut feed = ChatFeed::new(ORDER, BUYER);
        feed.reconcile(confirmed(4, "old", 500, None));
        feed.push_pending_at(draft("typing"), 9_000_000);

        let entries = feed.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(entries[0], FeedEntry::Confirmed(_)));
        assert!(matches!(entries[1], FeedEntry::Pending { .. }));
    }
}

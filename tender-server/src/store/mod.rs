//! redb-based storage layer for orders, offers and chat
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order headers |
//! | `order_items` | `item_id` | `OrderItem` | Requested line items |
//! | `offers` | `offer_id` | `Offer` | Supplier quotes |
//! | `offer_items` | `item_id` | `OfferItem` | Quoted line items |
//! | `chat_messages` | `message_id` | `ChatMessage` | Negotiation chat |
//! | `order_item_index` | `(order_id, item_id)` | `()` | Items per order |
//! | `offer_index` | `(order_id, offer_id)` | `()` | Offers per order |
//! | `offer_item_index` | `(offer_id, item_id)` | `()` | Items per offer |
//! | `chat_index` | `(order_id, message_id)` | `()` | Messages per order |
//! | `counters` | name | `u64` | Crash-safe ID allocation |
//!
//! # Transactions
//!
//! Every externally visible mutation happens inside a single
//! `WriteTransaction` owned by the calling service. Counter allocation
//! also runs inside that transaction, so IDs handed out by an aborted
//! operation are never observable. redb commits with
//! `Durability::Immediate`; a dropped transaction leaves no trace.

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::chat::ChatMessage;
use shared::error::MarketError;
use shared::order::{Offer, OfferItem, Order, OrderItem};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

type BlobTable = TableDefinition<'static, u64, &'static [u8]>;
type IndexTable = TableDefinition<'static, (u64, u64), ()>;

/// Order headers: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: BlobTable = TableDefinition::new("orders");

/// Requested line items: key = item_id, value = JSON-serialized OrderItem
const ORDER_ITEMS_TABLE: BlobTable = TableDefinition::new("order_items");

/// Supplier quotes: key = offer_id, value = JSON-serialized Offer
const OFFERS_TABLE: BlobTable = TableDefinition::new("offers");

/// Quoted line items: key = item_id, value = JSON-serialized OfferItem
const OFFER_ITEMS_TABLE: BlobTable = TableDefinition::new("offer_items");

/// Chat messages: key = message_id, value = JSON-serialized ChatMessage
const CHAT_TABLE: BlobTable = TableDefinition::new("chat_messages");

/// Items per order: key = (order_id, item_id), value = empty (existence)
const ORDER_ITEM_INDEX: IndexTable = TableDefinition::new("order_item_index");

/// Offers per order: key = (order_id, offer_id), value = empty
const OFFER_INDEX: IndexTable = TableDefinition::new("offer_index");

/// Items per offer: key = (offer_id, item_id), value = empty
const OFFER_ITEM_INDEX: IndexTable = TableDefinition::new("offer_item_index");

/// Messages per order: key = (order_id, message_id), value = empty
const CHAT_INDEX: IndexTable = TableDefinition::new("chat_index");

/// ID counters: key = counter name, value = last allocated value
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

const ORDER_COUNT_KEY: &str = "order_count";
const ENTITY_SEQ_KEY: &str = "entity_seq";
const MESSAGE_SEQ_KEY: &str = "message_seq";

const BLOB_TABLES: [BlobTable; 5] = [
    ORDERS_TABLE,
    ORDER_ITEMS_TABLE,
    OFFERS_TABLE,
    OFFER_ITEMS_TABLE,
    CHAT_TABLE,
];

const INDEX_TABLES: [IndexTable; 4] = [
    ORDER_ITEM_INDEX,
    OFFER_INDEX,
    OFFER_ITEM_INDEX,
    CHAT_INDEX,
];

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for MarketError {
    fn from(e: StoreError) -> Self {
        MarketError::Transaction(e.to_string())
    }
}

/// Entity storage backed by redb
#[derive(Clone)]
pub struct EntityStore {
    db: Arc<Database>,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore").finish_non_exhaustive()
    }
}

impl EntityStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Create all tables so later read transactions never miss them
    fn init_tables(&self) -> StoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            for table in BLOB_TABLES {
                let _ = write_txn.open_table(table)?;
            }
            for table in INDEX_TABLES {
                let _ = write_txn.open_table(table)?;
            }
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    pub fn begin_write(&self) -> StoreResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== ID Counters ==========

    /// Increment a counter and return the new value (within transaction)
    ///
    /// Allocation is transactional: IDs from an aborted transaction
    /// are handed out again by the next one.
    fn next_id(&self, txn: &WriteTransaction, key: &str) -> StoreResult<u64> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        let current = table.get(key)?.map(|g| g.value()).unwrap_or(0);
        let next = current + 1;
        table.insert(key, next)?;
        Ok(next)
    }

    /// Allocate the next order number
    pub fn next_order_id(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        self.next_id(txn, ORDER_COUNT_KEY)
    }

    /// Allocate the next entity ID (items, offers)
    pub fn next_entity_id(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        self.next_id(txn, ENTITY_SEQ_KEY)
    }

    /// Allocate the next chat message ID (global total order)
    pub fn next_message_id(&self, txn: &WriteTransaction) -> StoreResult<u64> {
        self.next_id(txn, MESSAGE_SEQ_KEY)
    }

    /// Total orders ever created (read-only)
    pub fn order_count(&self) -> StoreResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table
            .get(ORDER_COUNT_KEY)?
            .map(|g| g.value())
            .unwrap_or(0))
    }

    // ========== Generic blob helpers ==========

    fn put_blob<T: Serialize>(
        &self,
        txn: &WriteTransaction,
        table: BlobTable,
        id: u64,
        value: &T,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(table)?;
        let bytes = serde_json::to_vec(value)?;
        table.insert(id, bytes.as_slice())?;
        Ok(())
    }

    fn get_blob<T: DeserializeOwned>(&self, table: BlobTable, id: u64) -> StoreResult<Option<T>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(table)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_blob_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        table: BlobTable,
        id: u64,
    ) -> StoreResult<Option<T>> {
        let table = txn.open_table(table)?;
        match table.get(id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    fn index_insert(
        &self,
        txn: &WriteTransaction,
        index: IndexTable,
        parent: u64,
        child: u64,
    ) -> StoreResult<()> {
        let mut table = txn.open_table(index)?;
        table.insert((parent, child), ())?;
        Ok(())
    }

    /// Child IDs under a parent, ascending
    fn child_ids(&self, index: IndexTable, parent: u64) -> StoreResult<Vec<u64>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(index)?;
        let mut ids = Vec::new();
        for result in table.range((parent, 0u64)..=(parent, u64::MAX))? {
            let (key, _) = result?;
            ids.push(key.value().1);
        }
        Ok(ids)
    }

    fn child_ids_txn(
        &self,
        txn: &WriteTransaction,
        index: IndexTable,
        parent: u64,
    ) -> StoreResult<Vec<u64>> {
        let table = txn.open_table(index)?;
        let mut ids = Vec::new();
        for result in table.range((parent, 0u64)..=(parent, u64::MAX))? {
            let (key, _) = result?;
            ids.push(key.value().1);
        }
        Ok(ids)
    }

    fn children<T: DeserializeOwned>(
        &self,
        index: IndexTable,
        primary: BlobTable,
        parent: u64,
    ) -> StoreResult<Vec<T>> {
        let ids = self.child_ids(index, parent)?;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(primary)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(value) = table.get(id)? {
                out.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(out)
    }

    fn children_txn<T: DeserializeOwned>(
        &self,
        txn: &WriteTransaction,
        index: IndexTable,
        primary: BlobTable,
        parent: u64,
    ) -> StoreResult<Vec<T>> {
        let ids = self.child_ids_txn(txn, index, parent)?;
        let table = txn.open_table(primary)?;
        let mut out = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(value) = table.get(id)? {
                out.push(serde_json::from_slice(value.value())?);
            }
        }
        Ok(out)
    }

    // ========== Orders ==========

    /// Insert or overwrite an order header
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StoreResult<()> {
        self.put_blob(txn, ORDERS_TABLE, order.id, order)
    }

    pub fn get_order(&self, id: u64) -> StoreResult<Option<Order>> {
        self.get_blob(ORDERS_TABLE, id)
    }

    pub fn get_order_txn(&self, txn: &WriteTransaction, id: u64) -> StoreResult<Option<Order>> {
        self.get_blob_txn(txn, ORDERS_TABLE, id)
    }

    /// List orders newest first
    pub fn list_orders(&self, limit: usize, offset: usize) -> StoreResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()?.rev().skip(offset).take(limit) {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Order Items ==========

    /// Insert or overwrite a requested line item (keeps the index current)
    pub fn put_order_item(&self, txn: &WriteTransaction, item: &OrderItem) -> StoreResult<()> {
        self.put_blob(txn, ORDER_ITEMS_TABLE, item.id, item)?;
        self.index_insert(txn, ORDER_ITEM_INDEX, item.order_id, item.id)
    }

    pub fn get_order_item(&self, id: u64) -> StoreResult<Option<OrderItem>> {
        self.get_blob(ORDER_ITEMS_TABLE, id)
    }

    pub fn get_order_item_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StoreResult<Option<OrderItem>> {
        self.get_blob_txn(txn, ORDER_ITEMS_TABLE, id)
    }

    pub fn items_for_order(&self, order_id: u64) -> StoreResult<Vec<OrderItem>> {
        self.children(ORDER_ITEM_INDEX, ORDER_ITEMS_TABLE, order_id)
    }

    pub fn items_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StoreResult<Vec<OrderItem>> {
        self.children_txn(txn, ORDER_ITEM_INDEX, ORDER_ITEMS_TABLE, order_id)
    }

    // ========== Offers ==========

    pub fn put_offer(&self, txn: &WriteTransaction, offer: &Offer) -> StoreResult<()> {
        self.put_blob(txn, OFFERS_TABLE, offer.id, offer)?;
        self.index_insert(txn, OFFER_INDEX, offer.order_id, offer.id)
    }

    pub fn get_offer(&self, id: u64) -> StoreResult<Option<Offer>> {
        self.get_blob(OFFERS_TABLE, id)
    }

    pub fn get_offer_txn(&self, txn: &WriteTransaction, id: u64) -> StoreResult<Option<Offer>> {
        self.get_blob_txn(txn, OFFERS_TABLE, id)
    }

    pub fn offers_for_order(&self, order_id: u64) -> StoreResult<Vec<Offer>> {
        self.children(OFFER_INDEX, OFFERS_TABLE, order_id)
    }

    pub fn offers_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StoreResult<Vec<Offer>> {
        self.children_txn(txn, OFFER_INDEX, OFFERS_TABLE, order_id)
    }

    // ========== Offer Items ==========

    pub fn put_offer_item(&self, txn: &WriteTransaction, item: &OfferItem) -> StoreResult<()> {
        self.put_blob(txn, OFFER_ITEMS_TABLE, item.id, item)?;
        self.index_insert(txn, OFFER_ITEM_INDEX, item.offer_id, item.id)
    }

    pub fn get_offer_item(&self, id: u64) -> StoreResult<Option<OfferItem>> {
        self.get_blob(OFFER_ITEMS_TABLE, id)
    }

    pub fn get_offer_item_txn(
        &self,
        txn: &WriteTransaction,
        id: u64,
    ) -> StoreResult<Option<OfferItem>> {
        self.get_blob_txn(txn, OFFER_ITEMS_TABLE, id)
    }

    pub fn items_for_offer(&self, offer_id: u64) -> StoreResult<Vec<OfferItem>> {
        self.children(OFFER_ITEM_INDEX, OFFER_ITEMS_TABLE, offer_id)
    }

    pub fn items_for_offer_txn(
        &self,
        txn: &WriteTransaction,
        offer_id: u64,
    ) -> StoreResult<Vec<OfferItem>> {
        self.children_txn(txn, OFFER_ITEM_INDEX, OFFER_ITEMS_TABLE, offer_id)
    }

    // ========== Chat Messages ==========

    pub fn put_message(&self, txn: &WriteTransaction, message: &ChatMessage) -> StoreResult<()> {
        self.put_blob(txn, CHAT_TABLE, message.id, message)?;
        self.index_insert(txn, CHAT_INDEX, message.order_id, message.id)
    }

    pub fn get_message(&self, id: u64) -> StoreResult<Option<ChatMessage>> {
        self.get_blob(CHAT_TABLE, id)
    }

    /// Messages of one order, ascending by message ID
    pub fn messages_for_order(&self, order_id: u64) -> StoreResult<Vec<ChatMessage>> {
        self.children(CHAT_INDEX, CHAT_TABLE, order_id)
    }

    pub fn messages_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: u64,
    ) -> StoreResult<Vec<ChatMessage>> {
        self.children_txn(txn, CHAT_INDEX, CHAT_TABLE, order_id)
    }

    /// All messages, ascending by message ID (thread overview scan)
    pub fn all_messages(&self) -> StoreResult<Vec<ChatMessage>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CHAT_TABLE)?;
        let mut out = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            out.push(serde_json::from_slice(value.value())?);
        }
        Ok(out)
    }

    // ========== Administrative reset ==========

    /// Drop every row and reset the ID counters
    pub fn wipe_all(&self) -> StoreResult<()> {
        let txn = self.db.begin_write()?;
        for table in BLOB_TABLES {
            txn.delete_table(table)?;
            let _ = txn.open_table(table)?;
        }
        for table in INDEX_TABLES {
            txn.delete_table(table)?;
            let _ = txn.open_table(table)?;
        }
        txn.delete_table(COUNTERS_TABLE)?;
        let _ = txn.open_table(COUNTERS_TABLE)?;
        txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{Currency, OrderStatus};

    fn sample_order(id: u64) -> Order {
        Order {
            id,
            buyer_id: 500,
            buyer_name: "Volga Motors".to_string(),
            buyer_phone: None,
            buyer_email: None,
            location: Some("Kazan".to_string()),
            status: OrderStatus::Processing,
            bidding_started: false,
            refusal_reason: None,
            deadline: None,
            created_at: 1_700_000_000_000,
            status_updated_at: 1_700_000_000_000,
        }
    }

    fn sample_item(id: u64, order_id: u64, name: &str) -> OrderItem {
        OrderItem {
            id,
            order_id,
            name: name.to_string(),
            quantity: 4,
            brand: None,
            article: None,
            uom: None,
            comment: None,
            commit_price: None,
            commit_currency: None,
        }
    }

    fn sample_offer(id: u64, order_id: u64, supplier_id: u64) -> Offer {
        Offer {
            id,
            order_id,
            supplier_id,
            supplier_name: format!("Supplier {}", supplier_id),
            supplier_phone: None,
            submitted_at: 1_700_000_000_000,
            updated_at: None,
            locked_at: None,
            locked_by: None,
        }
    }

    fn sample_message(id: u64, order_id: u64) -> ChatMessage {
        ChatMessage {
            id,
            order_id,
            sender_role: shared::chat::ChatRole::Admin,
            sender_id: 1,
            sender_name: "Desk".to_string(),
            recipient_id: 7,
            body: format!("message {}", id),
            attachment_url: None,
            item_ref: None,
            read: false,
            archived: false,
            created_at: 1_700_000_000_000,
            client_msg_id: None,
        }
    }

    #[test]
    fn test_id_allocation_rolls_back_with_transaction() {
        let store = EntityStore::open_in_memory().unwrap();

        // Allocate inside a transaction that never commits
        {
            let txn = store.begin_write().unwrap();
            assert_eq!(store.next_order_id(&txn).unwrap(), 1);
            assert_eq!(store.next_order_id(&txn).unwrap(), 2);
            // dropped without commit
        }

        // A fresh transaction sees the counter untouched
        let txn = store.begin_write().unwrap();
        assert_eq!(store.next_order_id(&txn).unwrap(), 1);
        txn.commit().unwrap();

        assert_eq!(store.order_count().unwrap(), 1);
    }

    #[test]
    fn test_dropped_transaction_discards_every_row() {
        let store = EntityStore::open_in_memory().unwrap();

        let txn = store.begin_write().unwrap();
        store.put_order(&txn, &sample_order(1)).unwrap();
        store
            .put_order_item(&txn, &sample_item(10, 1, "Brake Pads"))
            .unwrap();
        txn.commit().unwrap();

        // Multi-row mutation that dies before the commit, as if a later
        // row write had failed partway
        {
            let txn = store.begin_write().unwrap();
            let mut order = store.get_order_txn(&txn, 1).unwrap().unwrap();
            order.status = OrderStatus::ProposalSent;
            store.put_order(&txn, &order).unwrap();

            let mut item = store.get_order_item_txn(&txn, 10).unwrap().unwrap();
            item.commit_price = Some(rust_decimal::Decimal::new(280, 0));
            item.commit_currency = Some(Currency::Rub);
            store.put_order_item(&txn, &item).unwrap();
            // dropped without commit
        }

        let order = store.get_order(1).unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Processing);
        let item = store.get_order_item(10).unwrap().unwrap();
        assert_eq!(item.commit_price, None);
        assert_eq!(item.commit_currency, None);
    }

    #[test]
    fn test_counters_are_independent() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        assert_eq!(store.next_order_id(&txn).unwrap(), 1);
        assert_eq!(store.next_entity_id(&txn).unwrap(), 1);
        assert_eq!(store.next_entity_id(&txn).unwrap(), 2);
        assert_eq!(store.next_message_id(&txn).unwrap(), 1);
        txn.commit().unwrap();
    }

    #[test]
    fn test_items_listed_per_order() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put_order(&txn, &sample_order(1)).unwrap();
        store.put_order(&txn, &sample_order(2)).unwrap();
        store.put_order_item(&txn, &sample_item(10, 1, "Brake Pads")).unwrap();
        store.put_order_item(&txn, &sample_item(11, 2, "Oil Filter")).unwrap();
        store.put_order_item(&txn, &sample_item(12, 1, "Spark Plug")).unwrap();
        txn.commit().unwrap();

        let items = store.items_for_order(1).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Brake Pads");
        assert_eq!(items[1].name, "Spark Plug");

        let items = store.items_for_order(2).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Oil Filter");
    }

    #[test]
    fn test_offers_scoped_to_order() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put_order(&txn, &sample_order(1)).unwrap();
        store.put_offer(&txn, &sample_offer(20, 1, 701)).unwrap();
        store.put_offer(&txn, &sample_offer(21, 1, 702)).unwrap();
        store.put_offer(&txn, &sample_offer(22, 9, 701)).unwrap();
        txn.commit().unwrap();

        let offers = store.offers_for_order(1).unwrap();
        assert_eq!(offers.len(), 2);
        assert!(offers.iter().all(|o| o.order_id == 1));
        assert!(store.get_offer(22).unwrap().is_some());
    }

    #[test]
    fn test_messages_ordered_by_id() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        store.put_message(&txn, &sample_message(3, 1)).unwrap();
        store.put_message(&txn, &sample_message(1, 1)).unwrap();
        store.put_message(&txn, &sample_message(2, 1)).unwrap();
        txn.commit().unwrap();

        let messages = store.messages_for_order(1).unwrap();
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_list_orders_newest_first() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        for id in 1..=5 {
            store.put_order(&txn, &sample_order(id)).unwrap();
        }
        txn.commit().unwrap();

        let page = store.list_orders(2, 0).unwrap();
        assert_eq!(page.iter().map(|o| o.id).collect::<Vec<_>>(), vec![5, 4]);

        let page = store.list_orders(2, 2).unwrap();
        assert_eq!(page.iter().map(|o| o.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn test_wipe_all_resets_counters() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        let order_id = store.next_order_id(&txn).unwrap();
        let mut order = sample_order(order_id);
        order.status = OrderStatus::Processing;
        store.put_order(&txn, &order).unwrap();
        store.put_order_item(&txn, &sample_item(10, order_id, "Brake Pads")).unwrap();
        txn.commit().unwrap();

        store.wipe_all().unwrap();

        assert!(store.get_order(order_id).unwrap().is_none());
        assert!(store.items_for_order(order_id).unwrap().is_empty());
        assert_eq!(store.order_count().unwrap(), 0);

        // Counter restarts from 1
        let txn = store.begin_write().unwrap();
        assert_eq!(store.next_order_id(&txn).unwrap(), 1);
        txn.commit().unwrap();
    }

    #[test]
    fn test_overwrite_keeps_single_row() {
        let store = EntityStore::open_in_memory().unwrap();
        let txn = store.begin_write().unwrap();
        let mut item = sample_item(10, 1, "Brake Pads");
        store.put_order_item(&txn, &item).unwrap();
        item.commit_price = Some(rust_decimal::Decimal::new(30000, 2));
        item.commit_currency = Some(Currency::Rub);
        store.put_order_item(&txn, &item).unwrap();
        txn.commit().unwrap();

        let items = store.items_for_order(1).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].commit_price, Some(rust_decimal::Decimal::new(30000, 2)));
    }
}

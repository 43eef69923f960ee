//! Shared server state
//!
//! `ServerState` holds one instance of every engine service over a
//! single [`EntityStore`]; cloning it is shallow (`Arc` all the way
//! down), so axum handlers clone freely.
//!
//! # Components
//!
//! | Field | Purpose |
//! |-------|---------|
//! | `config` | Immutable runtime configuration |
//! | `store` | redb-backed entity storage |
//! | `hub` | Event broadcast channels |
//! | `orders` | Order intake and editing |
//! | `lifecycle` | Status transitions |
//! | `bids` | Offer intake |
//! | `locks` | Offer edit leases |
//! | `ranking` | Winner toggling, bid board |
//! | `approval` | Atomic proposal commit |
//! | `chat` | Negotiation threads |

use std::sync::Arc;

use crate::approval::ApprovalCommitter;
use crate::bidding::{BidCollector, EditLockGuard, RankEngine};
use crate::chat::{ChannelHub, ChatThreadManager};
use crate::core::error::Result;
use crate::core::Config;
use crate::orders::{LifecycleService, OrderService};
use crate::store::EntityStore;

#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Arc<Config>,
    pub store: EntityStore,
    pub hub: ChannelHub,
    pub orders: OrderService,
    pub lifecycle: LifecycleService,
    pub bids: BidCollector,
    pub locks: EditLockGuard,
    pub ranking: RankEngine,
    pub approval: ApprovalCommitter,
    pub chat: ChatThreadManager,
    /// Instance ID minted at startup; clients detect restarts by it
    pub epoch: String,
}

impl ServerState {
    /// Open storage under the configured data directory and wire up
    /// every service
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let store = EntityStore::open(config.db_path())?;
        Ok(Self::with_store(config.clone(), store))
    }

    /// Build state over an already-open store
    pub fn with_store(config: Config, store: EntityStore) -> Self {
        let hub = ChannelHub::with_capacity(config.channel_capacity);
        let locks = EditLockGuard::new(store.clone(), config.edit_lock_timeout_secs);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "Server state initialized");

        Self {
            orders: OrderService::new(store.clone(), hub.clone()),
            lifecycle: LifecycleService::new(store.clone(), hub.clone()),
            bids: BidCollector::new(store.clone(), hub.clone(), locks.clone()),
            ranking: RankEngine::new(store.clone(), hub.clone(), locks.clone()),
            approval: ApprovalCommitter::new(store.clone(), hub.clone()),
            chat: ChatThreadManager::new(store.clone(), hub.clone()),
            config: Arc::new(config),
            store,
            hub,
            locks,
            epoch,
        }
    }
}

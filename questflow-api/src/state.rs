//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use questflow_core::RewardsConfig;
use questflow_storage::{InMemoryStore, QuestStore};

use crate::config::StoreBackend;
use crate::db::{DbClient, DbConfig};
use crate::error::ApiResult;

/// Store handle shared by all handlers. Either the Postgres client or the
/// in-memory store, chosen at startup.
pub type SharedStore = Arc<dyn QuestStore>;

/// Application-wide state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Milestone table and referral link base.
    pub rewards: Arc<RewardsConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: SharedStore, rewards: RewardsConfig) -> Self {
        Self {
            store,
            rewards: Arc::new(rewards),
            start_time: Instant::now(),
        }
    }
}

crate::impl_from_ref!(SharedStore, store);
crate::impl_from_ref!(Arc<RewardsConfig>, rewards);
crate::impl_from_ref!(Instant, start_time);

/// Build the store selected by configuration. The Postgres store is migrated
/// before it is returned.
pub async fn connect_store(backend: StoreBackend) -> ApiResult<SharedStore> {
    match backend {
        StoreBackend::Postgres => {
            let db_config = DbConfig::from_env();
            let db = DbClient::from_config(&db_config)?;
            db.migrate().await?;
            tracing::info!(
                host = %db_config.host,
                dbname = %db_config.dbname,
                max_pool_size = db_config.max_size,
                "Using Postgres store"
            );
            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

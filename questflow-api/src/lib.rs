//! QUESTFLOW API - REST Layer for Progression and Referral Rewards
//!
//! Axum routes over a `QuestStore`: Postgres (`DbClient`) in production, the
//! in-memory store for development and tests. All derived values (levels,
//! tiers, earned and claimable rewards) come from `questflow-core`.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod macros;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{resolve_bind_addr, ApiConfig, StoreBackend};
pub use db::{DbClient, DbConfig};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::{connect_store, AppState, SharedStore};
pub use types::*;

//! Service Layer
//!
//! Request-level operations: validate input, call the store, derive views
//! through the core engines. Handlers stay thin wrappers around these.

mod profile_service;
mod referral_service;

pub use profile_service::*;
pub use referral_service::*;

use std::future::Future;
use std::time::Instant;

use questflow_core::QuestResult;
use questflow_storage::QuestStore;

use crate::telemetry::metrics::with_metrics;

/// Await a store call, recording its latency and outcome.
async fn observe<T, F>(store: &dyn QuestStore, operation: &'static str, call: F) -> QuestResult<T>
where
    F: Future<Output = QuestResult<T>>,
{
    let start = Instant::now();
    let result = call.await;
    let elapsed = start.elapsed().as_secs_f64();
    with_metrics(|metrics| {
        metrics.record_store_operation(operation, store.backend_name(), result.is_ok(), elapsed)
    });
    result
}

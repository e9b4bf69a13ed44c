//! Prometheus metrics for HTTP traffic, store calls and reward payouts.
//!
//! Everything registers into the default registry and is scraped from
//! `GET /metrics`.

use axum::{http::StatusCode, response::IntoResponse};
use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter, CounterVec, Encoder,
    HistogramVec, IntCounter, TextEncoder,
};

use crate::error::{ApiError, ApiResult};

// Seconds, 1ms..10s.
const HTTP_LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 10.0,
];

const STORE_LATENCY_BUCKETS: &[f64] =
    &[0.0005, 0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5];

pub static METRICS: Lazy<ApiResult<QuestflowMetrics>> = Lazy::new(QuestflowMetrics::new);

/// How a claim request ended, for the `status` label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    Claimed,
    NothingToClaim,
    Failed,
}

impl ClaimOutcome {
    pub fn as_label(self) -> &'static str {
        match self {
            ClaimOutcome::Claimed => "claimed",
            ClaimOutcome::NothingToClaim => "no_rewards",
            ClaimOutcome::Failed => "error",
        }
    }
}

/// Container for all QUESTFLOW metrics.
#[derive(Clone)]
pub struct QuestflowMetrics {
    /// method, path, status
    pub http_requests_total: CounterVec,

    /// method, path
    pub http_request_duration_seconds: HistogramVec,

    /// operation, backend, status
    pub store_operations_total: CounterVec,

    /// operation, backend
    pub store_operation_duration_seconds: HistogramVec,

    /// Claim attempts - labels: status
    pub referral_claims_total: CounterVec,

    /// Sum of all claimed amounts, in hundredths of a tTRUST
    pub referral_claimed_hundredths_total: IntCounter,
}

fn registration_error(name: &str, err: prometheus::Error) -> ApiError {
    ApiError::internal_error(format!("Failed to register {}: {}", name, err))
}

impl QuestflowMetrics {
    /// Create and register all metrics with the default Prometheus registry.
    pub fn new() -> ApiResult<Self> {
        Ok(Self {
            http_requests_total: register_counter_vec!(
                "questflow_http_requests_total",
                "Total number of HTTP requests",
                &["method", "path", "status"]
            )
            .map_err(|e| registration_error("http_requests_total", e))?,

            http_request_duration_seconds: register_histogram_vec!(
                "questflow_http_request_duration_seconds",
                "HTTP request duration in seconds",
                &["method", "path"],
                HTTP_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("http_request_duration_seconds", e))?,

            store_operations_total: register_counter_vec!(
                "questflow_store_operations_total",
                "Total number of store operations",
                &["operation", "backend", "status"]
            )
            .map_err(|e| registration_error("store_operations_total", e))?,

            store_operation_duration_seconds: register_histogram_vec!(
                "questflow_store_operation_duration_seconds",
                "Store operation duration in seconds",
                &["operation", "backend"],
                STORE_LATENCY_BUCKETS.to_vec()
            )
            .map_err(|e| registration_error("store_operation_duration_seconds", e))?,

            referral_claims_total: register_counter_vec!(
                "questflow_referral_claims_total",
                "Referral reward claim attempts",
                &["status"]
            )
            .map_err(|e| registration_error("referral_claims_total", e))?,

            referral_claimed_hundredths_total: register_int_counter!(
                "questflow_referral_claimed_hundredths_total",
                "Total referral rewards paid out, in hundredths of a tTRUST"
            )
            .map_err(|e| registration_error("referral_claimed_hundredths_total", e))?,
        })
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let status_str = status.to_string();
        self.http_requests_total
            .with_label_values(&[method, path, &status_str])
            .inc();
        self.http_request_duration_seconds
            .with_label_values(&[method, path])
            .observe(duration_secs);
    }

    /// Record a store operation.
    pub fn record_store_operation(
        &self,
        operation: &str,
        backend: &str,
        success: bool,
        duration_secs: f64,
    ) {
        let status = if success { "success" } else { "error" };
        self.store_operations_total
            .with_label_values(&[operation, backend, status])
            .inc();
        self.store_operation_duration_seconds
            .with_label_values(&[operation, backend])
            .observe(duration_secs);
    }

    /// Record a claim attempt. `hundredths` is the paid amount, zero unless
    /// the claim succeeded.
    pub fn record_claim(&self, outcome: ClaimOutcome, hundredths: u64) {
        self.referral_claims_total
            .with_label_values(&[outcome.as_label()])
            .inc();
        if outcome == ClaimOutcome::Claimed {
            self.referral_claimed_hundredths_total.inc_by(hundredths);
        }
    }
}

/// Run `f` against the global metrics. A registration failure is logged and
/// the recording skipped; metrics never fail a request.
pub fn with_metrics(f: impl FnOnce(&QuestflowMetrics)) {
    match METRICS.as_ref() {
        Ok(metrics) => f(metrics),
        Err(e) => tracing::warn!(error = %e, "Metrics unavailable"),
    }
}

/// Text exposition of the default registry.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Observability",
    responses(
        (status = 200, description = "Prometheus metrics in text format", content_type = "text/plain"),
        (status = 500, description = "Failed to encode metrics"),
    ),
)]
pub async fn metrics_handler() -> impl IntoResponse {
    // Register the QUESTFLOW families even before the first request.
    with_metrics(|_| {});

    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    match encoder.encode(&metric_families, &mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("content-type", "text/plain")],
                format!("Failed to encode metrics: {}", e).into_bytes(),
            )
        }
    }
}

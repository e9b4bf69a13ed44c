//! API Configuration Module
//!
//! CORS, request timeout, store selection and bind address. Configuration is
//! loaded from environment variables with defaults for development.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};

// ============================================================================
// STORE BACKEND
// ============================================================================

/// Which store the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Process-local store; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StoreBackend::Postgres),
            "memory" | "in-memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ApiError::invalid_input(format!(
                "Unknown store backend '{}', expected 'postgres' or 'memory'",
                other
            ))),
        }
    }
}

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins (dev mode).
    pub cors_origins: Vec<String>,

    pub cors_allow_credentials: bool,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Per-request deadline enforced by the HTTP layer.
    pub request_timeout: Duration,

    pub store: StoreBackend,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_allow_credentials: false,
            cors_max_age_secs: 86400,
            request_timeout: Duration::from_secs(30),
            store: StoreBackend::Postgres,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `QUESTFLOW_CORS_ORIGINS`: Comma-separated allowed origins (empty = allow all)
    /// - `QUESTFLOW_CORS_ALLOW_CREDENTIALS`: "true" or "false" (default: false)
    /// - `QUESTFLOW_CORS_MAX_AGE_SECS`: Preflight cache duration (default: 86400)
    /// - `QUESTFLOW_REQUEST_TIMEOUT_SECS`: Request deadline (default: 30)
    /// - `QUESTFLOW_STORE`: "postgres" or "memory" (default: postgres)
    pub fn from_env() -> ApiResult<Self> {
        let cors_origins = std::env::var("QUESTFLOW_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_allow_credentials = std::env::var("QUESTFLOW_CORS_ALLOW_CREDENTIALS")
            .ok()
            .map(|s| s.to_lowercase() == "true")
            .unwrap_or(false);

        let cors_max_age_secs = std::env::var("QUESTFLOW_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let request_timeout = Duration::from_secs(
            std::env::var("QUESTFLOW_REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs: &u64| *secs > 0)
                .unwrap_or(30),
        );

        let store = match std::env::var("QUESTFLOW_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::default(),
        };

        Ok(Self {
            cors_origins,
            cors_allow_credentials,
            cors_max_age_secs,
            request_timeout,
            store,
        })
    }

    /// Check if running in production mode (strict CORS).
    pub fn is_production(&self) -> bool {
        !self.cors_origins.is_empty()
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

// ============================================================================
// BIND ADDRESS
// ============================================================================

/// Resolve the listen address from `QUESTFLOW_API_BIND` and
/// `PORT` / `QUESTFLOW_API_PORT`.
pub fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("QUESTFLOW_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("QUESTFLOW_API_PORT").ok());
    bind_addr(&host, port.as_deref())
}

fn bind_addr(host: &str, port: Option<&str>) -> ApiResult<SocketAddr> {
    let port_str = port.unwrap_or("3000");
    let port = port_str
        .parse::<u16>()
        .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", port_str)))?;

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}

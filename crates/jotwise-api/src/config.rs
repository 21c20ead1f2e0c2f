//! Server configuration from the environment.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use governor::{Quota, RateLimiter};
use tracing::warn;

use jotwise_core::{Error, Result};
use jotwise_db::PoolConfig;

use crate::state::GlobalRateLimiter;

const DEFAULT_ORIGINS: &str = "http://localhost:3000";

/// Settings read once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub db_max_connections: u32,
    /// Seconds a query waits for a pooled connection.
    pub db_acquire_timeout_secs: u64,
    /// Comma-separated CORS origins.
    pub allowed_origins: String,
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_period_secs: u64,
    /// Base URL of the hosted auth service.
    pub auth_url: String,
    /// Public key sent as `apikey` to the auth service.
    pub auth_anon_key: String,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            database_url: "postgres://localhost/jotwise".to_string(),
            db_max_connections: jotwise_db::pool::DEFAULT_MAX_CONNECTIONS,
            db_acquire_timeout_secs: jotwise_db::pool::DEFAULT_ACQUIRE_TIMEOUT_SECS,
            allowed_origins: DEFAULT_ORIGINS.to_string(),
            rate_limit_enabled: true,
            rate_limit_requests: 20,
            rate_limit_period_secs: 60,
            auth_url: "http://localhost:54321".to_string(),
            auth_anon_key: String::new(),
            body_limit_bytes: crate::DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_max_connections),
            db_acquire_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.db_acquire_timeout_secs),
            allowed_origins: std::env::var("ALLOWED_ORIGINS").unwrap_or(defaults.allowed_origins),
            rate_limit_enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(defaults.rate_limit_enabled),
            rate_limit_requests: std::env::var("RATE_LIMIT_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_requests),
            rate_limit_period_secs: std::env::var("RATE_LIMIT_PERIOD_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.rate_limit_period_secs),
            auth_url: std::env::var("AUTH_URL").unwrap_or(defaults.auth_url),
            auth_anon_key: std::env::var("AUTH_ANON_KEY").unwrap_or(defaults.auth_anon_key),
            body_limit_bytes: defaults.body_limit_bytes,
        }
    }

    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            max_connections: self.db_max_connections,
            acquire_timeout: Duration::from_secs(self.db_acquire_timeout_secs),
            ..PoolConfig::default()
        }
    }

    /// Parsed CORS origins; invalid entries are skipped with a warning.
    pub fn cors_origins(&self) -> Vec<HeaderValue> {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .split(',')
            .filter_map(|s| {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<HeaderValue>() {
                    Ok(v) => Some(v),
                    Err(e) => {
                        warn!("Invalid CORS origin '{}': {}", trimmed, e);
                        None
                    }
                }
            })
            .collect();

        if origins.is_empty() {
            vec![HeaderValue::from_static(DEFAULT_ORIGINS)]
        } else {
            origins
        }
    }

    /// Global limiter for the configured quota, or `None` when disabled.
    pub fn rate_limiter(&self) -> Result<Option<Arc<GlobalRateLimiter>>> {
        if !self.rate_limit_enabled {
            return Ok(None);
        }
        build_rate_limiter(self.rate_limit_requests, self.rate_limit_period_secs).map(Some)
    }
}

/// Allow `requests` per `period_secs`, all available as a burst.
pub fn build_rate_limiter(requests: u32, period_secs: u64) -> Result<Arc<GlobalRateLimiter>> {
    let burst = NonZeroU32::new(requests)
        .ok_or_else(|| Error::Config("RATE_LIMIT_REQUESTS must be non-zero".to_string()))?;
    let quota = Quota::with_period(Duration::from_secs(period_secs))
        .ok_or_else(|| Error::Config("RATE_LIMIT_PERIOD_SECS must be non-zero".to_string()))?
        .allow_burst(burst);
    Ok(Arc::new(RateLimiter::direct(quota)))
}

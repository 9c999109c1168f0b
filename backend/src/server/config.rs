//! Server settings and the runtime configuration built from them.
//!
//! [`ServerSettings`] is layered by `ortho_config` from CLI flags,
//! `CARPOOL_*` environment variables and an optional config file.
//! [`ServerConfig`] carries the resolved runtime pieces into
//! [`super::create_server`].

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use carpool_backend::domain::ports::AuthProvider;
use carpool_backend::outbound::persistence::{DbPool, PoolConfig, PoolError};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Problems with the loaded settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// `bind_addr` did not parse as `host:port`.
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    /// `database_url` was not supplied by any layer.
    #[error("database_url is required (set CARPOOL_DATABASE_URL or --database-url)")]
    MissingDatabaseUrl,
    /// Pool sizing or timeout settings contradict each other.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Operator-facing server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CARPOOL")]
pub struct ServerSettings {
    /// Socket address to listen on; defaults to `0.0.0.0:8080`.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections; defaults to 10.
    pub db_pool_max_size: Option<u32>,
    /// Connections opened at start-up and kept warm.
    pub db_pool_min_idle: Option<u32>,
    /// Seconds a request waits for a free connection; defaults to 30.
    pub db_pool_checkout_timeout_secs: Option<u64>,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = true)]
    pub run_migrations: bool,
}

impl ServerSettings {
    /// Resolved listen address.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidBindAddr`] for malformed input.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.trim()
            .parse()
            .map_err(|source| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                source,
            })
    }

    /// Database URL.
    ///
    /// # Errors
    /// Returns [`SettingsError::MissingDatabaseUrl`] when unset or blank.
    pub fn database_url(&self) -> Result<&str, SettingsError> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingDatabaseUrl)
    }

    /// Pool configuration with every unset knob left at its default.
    ///
    /// # Errors
    /// Fails without a database URL or when the pool settings contradict
    /// each other.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        let mut config = PoolConfig::new(self.database_url()?);
        if let Some(max_size) = self.db_pool_max_size {
            config = config.with_max_size(max_size);
        }
        if self.db_pool_min_idle.is_some() {
            config = config.with_min_idle(self.db_pool_min_idle);
        }
        if let Some(secs) = self.db_pool_checkout_timeout_secs {
            config = config.with_checkout_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) auth: Arc<dyn AuthProvider>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from its required collaborators.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            bind_addr,
            db_pool,
            auth,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}

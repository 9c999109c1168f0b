//! Connection pool shared by the carpool repositories.
//!
//! Every repository clones one [`DbPool`]; a checkout that outlasts the
//! configured timeout becomes [`PoolError::Checkout`], which the
//! repositories report as their port's `Connection` error.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use tracing::info;

const DEFAULT_MAX_SIZE: u32 = 10;
const DEFAULT_CHECKOUT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became free in time, or a new one could not be opened.
    #[error("failed to get connection from pool: {message}")]
    Checkout { message: String },

    /// The pool could not be created.
    #[error("failed to build connection pool: {message}")]
    Build { message: String },

    /// Sizing or timeout settings contradict each other.
    #[error("invalid pool settings: {message}")]
    InvalidConfig { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}

/// Sizing and timeouts for [`DbPool`].
///
/// Defaults: 10 connections, none held idle, 30 second checkout timeout.
///
/// ```
/// use std::time::Duration;
/// use carpool_backend::outbound::persistence::PoolConfig;
///
/// let config = PoolConfig::new("postgres://carpool@localhost/carpool")
///     .with_max_size(20)
///     .with_min_idle(Some(4))
///     .with_checkout_timeout(Duration::from_secs(5));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    checkout_timeout: Duration,
}

impl PoolConfig {
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_MAX_SIZE,
            min_idle: None,
            checkout_timeout: DEFAULT_CHECKOUT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Connections opened eagerly and kept warm; `None` opens lazily.
    #[must_use]
    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    #[must_use]
    pub fn with_checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    /// Reject an empty pool, more idle connections than the pool can hold,
    /// and a zero checkout timeout.
    ///
    /// # Errors
    /// Returns [`PoolError::InvalidConfig`] naming the offending setting.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.max_size == 0 {
            return Err(PoolError::invalid_config("max_size must be at least 1"));
        }
        if let Some(min_idle) = self.min_idle.filter(|idle| *idle > self.max_size) {
            return Err(PoolError::invalid_config(format!(
                "min_idle {min_idle} exceeds max_size {}",
                self.max_size
            )));
        }
        if self.checkout_timeout.is_zero() {
            return Err(PoolError::invalid_config(
                "checkout timeout must be positive",
            ));
        }
        Ok(())
    }
}

/// Async PostgreSQL pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Validate `config` and build the pool.
    ///
    /// # Errors
    /// [`PoolError::InvalidConfig`] for contradictory settings,
    /// [`PoolError::Build`] when eager `min_idle` connections fail.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle)
            .connection_timeout(config.checkout_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        info!(
            max_size = config.max_size,
            min_idle = ?config.min_idle,
            checkout_timeout_secs = config.checkout_timeout.as_secs(),
            "database pool ready"
        );
        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when none is available within the timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const URL: &str = "postgres://carpool@localhost/carpool";

    #[rstest]
    fn defaults_are_lazy_and_valid() {
        let config = PoolConfig::new(URL);

        assert_eq!(config.max_size, DEFAULT_MAX_SIZE);
        assert_eq!(config.min_idle, None);
        assert_eq!(config.checkout_timeout, DEFAULT_CHECKOUT_TIMEOUT);
        assert!(config.validate().is_ok());
    }

    #[rstest]
    #[case(PoolConfig::new(URL).with_max_size(0), "max_size")]
    #[case(
        PoolConfig::new(URL).with_max_size(2).with_min_idle(Some(3)),
        "min_idle 3 exceeds max_size 2"
    )]
    #[case(PoolConfig::new(URL).with_checkout_timeout(Duration::ZERO), "timeout")]
    fn contradictory_settings_are_rejected(#[case] config: PoolConfig, #[case] fragment: &str) {
        let err = config.validate().expect_err("invalid settings");

        assert!(matches!(err, PoolError::InvalidConfig { .. }));
        assert!(err.to_string().contains(fragment), "{err}");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_settings_fail_before_connecting() {
        let result = DbPool::new(PoolConfig::new(URL).with_max_size(0)).await;

        assert!(matches!(result, Err(PoolError::InvalidConfig { .. })));
    }
}

//! Async PostgreSQL connection pool shared by the repositories.
//!
//! A thin wrapper over `diesel-async`'s bb8 pool. Sizing and the checkout
//! timeout come from server configuration; repositories only ever see
//! [`DbPool::get`] and the two [`PoolError`] variants.

use std::time::Duration;

use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::AsyncPgConnection;

/// Errors raised while building the pool or checking out a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// The pool could not be built against the configured database.
    #[error("database pool setup failed: {0}")]
    Setup(String),

    /// No connection became available within the checkout timeout.
    #[error("no database connection available: {0}")]
    Exhausted(String),
}

/// Pool settings handed down from the server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    /// Bundle the connection URL with the configured sizing.
    pub fn new(
        database_url: impl Into<String>,
        max_size: u32,
        connection_timeout: Duration,
    ) -> Self {
        Self {
            database_url: database_url.into(),
            max_size,
            connection_timeout,
        }
    }
}

/// Async connection pool for PostgreSQL via Diesel.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool from the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Setup`] when the pool cannot be constructed.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(&config.database_url);

        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::Setup(err.to_string()))?;

        Ok(Self { inner })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Exhausted`] when no connection becomes available
    /// within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::Exhausted(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn config_keeps_the_settings_it_was_given() {
        let config = PoolConfig::new("postgres://localhost/campus", 4, Duration::from_secs(5));
        assert_eq!(
            config,
            PoolConfig {
                database_url: "postgres://localhost/campus".to_owned(),
                max_size: 4,
                connection_timeout: Duration::from_secs(5),
            }
        );
    }

    #[rstest]
    fn error_variants_name_their_failure_mode() {
        let setup = PoolError::Setup("bad url".into());
        assert!(setup.to_string().contains("setup failed"));
        assert!(setup.to_string().contains("bad url"));

        let exhausted = PoolError::Exhausted("timed out".into());
        assert!(exhausted.to_string().contains("no database connection"));
        assert!(exhausted.to_string().contains("timed out"));
    }
}

//! Connection pooling.
//!
//! Wraps a `deadpool_postgres::Pool` built from a connection URL and
//! remembers which logical database it points at, so callers can key their
//! [`CatalogLock`](crate::CatalogLock) on it.

use deadpool_postgres::{Manager, ManagerConfig, RecyclingMethod};
use tokio_postgres::NoTls;

use crate::error::Error;

#[derive(Clone)]
pub struct Pool {
    inner: deadpool_postgres::Pool,
    database: String,
}

impl Pool {
    /// Build a pool from a `postgres://` URL or a `key=value` connection string.
    ///
    /// No connection is opened until the first [`Pool::get`].
    pub fn connect(database_url: &str, max_size: usize) -> crate::Result<Self> {
        let config: tokio_postgres::Config = database_url
            .parse()
            .map_err(|e: tokio_postgres::Error| Error::Config(e.to_string()))?;

        // Postgres defaults the database name to the user name.
        let database = config
            .get_dbname()
            .or(config.get_user())
            .unwrap_or("postgres")
            .to_owned();

        let mut manager_config = ManagerConfig::default();
        manager_config.recycling_method = RecyclingMethod::Fast;
        let manager = Manager::from_config(config, NoTls, manager_config);

        let inner = deadpool_postgres::Pool::builder(manager)
            .max_size(max_size)
            .build()
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Self { inner, database })
    }

    /// Check a connection out of the pool.
    pub async fn get(&self) -> crate::Result<deadpool_postgres::Object> {
        Ok(self.inner.get().await?)
    }

    /// The logical database this pool connects to.
    pub fn database(&self) -> &str {
        &self.database
    }
}

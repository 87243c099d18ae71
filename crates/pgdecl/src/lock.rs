//! Per-database catalog lock.
//!
//! Catalog DDL has no multi-statement isolation visible from here, so every
//! resource kind working on the same database shares one readers-writer
//! lock. Writers (create, update, delete, exists) hold it exclusively;
//! readers share it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A cloneable handle to one database's catalog lock.
///
/// Guards release on drop, so every exit path of an operation lets go.
#[derive(Debug, Clone, Default)]
pub struct CatalogLock {
    inner: Arc<RwLock<()>>,
}

impl CatalogLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusively.
    pub async fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.inner.write().await
    }

    /// Acquire shared.
    pub async fn read(&self) -> RwLockReadGuard<'_, ()> {
        self.inner.read().await
    }

    /// Whether both handles guard the same database.
    pub fn same_as(&self, other: &CatalogLock) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

/// Registry of catalog locks keyed by logical target database.
#[derive(Debug, Default)]
pub struct CatalogLocks {
    locks: Mutex<HashMap<String, CatalogLock>>,
}

impl CatalogLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock for `database`, created on first use.
    pub fn for_database(&self, database: &str) -> CatalogLock {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(database.to_owned()).or_default().clone()
    }
}

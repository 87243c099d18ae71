//! Catalog gateway for extensions.
//!
//! Each method is exactly one round trip: one DDL statement or one catalog
//! query. Locking and feature gating live a level up, in
//! [`ExtensionResource`](crate::ExtensionResource).

use std::future::Future;

use pgdecl_sql::{EXTENSION_EXISTS_SQL, EXTENSION_READ_SQL, ExtensionStmt, render};

use crate::error::{Error, Operation};
use crate::extension::InstalledExtension;
use crate::traced::{Connection, ConnectionExt};

#[cfg(test)]
pub(crate) mod fake;

/// The SQL operations needed to manage one extension.
pub trait ExtensionCatalog: Send + Sync {
    /// `CREATE EXTENSION IF NOT EXISTS`, with the optional clauses only when given.
    fn create(
        &self,
        name: &str,
        schema: Option<&str>,
        version: Option<&str>,
    ) -> impl Future<Output = crate::Result<()>> + Send;

    /// Read the installed extension, with its schema resolved by name.
    /// `None` when no such extension is installed.
    fn fetch(&self, name: &str)
    -> impl Future<Output = crate::Result<Option<InstalledExtension>>> + Send;

    /// Lightweight existence probe.
    fn exists(&self, name: &str) -> impl Future<Output = crate::Result<bool>> + Send;

    /// Move the extension's objects into `schema`.
    fn relocate(&self, name: &str, schema: &str) -> impl Future<Output = crate::Result<()>> + Send;

    /// Update to `version`, or to the default version when `None`.
    fn reversion(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> impl Future<Output = crate::Result<()>> + Send;

    /// Drop the extension. Does not cascade.
    fn drop_extension(&self, name: &str) -> impl Future<Output = crate::Result<()>> + Send;
}

/// [`ExtensionCatalog`] backed by a live PostgreSQL connection.
pub struct PgCatalog<C> {
    conn: C,
}

impl<C: Connection> PgCatalog<C> {
    pub fn new(conn: C) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    async fn run(&self, stmt: ExtensionStmt, op: Operation) -> crate::Result<()> {
        let sql = render(&stmt);
        self.conn
            .traced(op)
            .extension(stmt.name())
            .execute(&sql)
            .await?;
        Ok(())
    }
}

impl<C: Connection> ExtensionCatalog for PgCatalog<C> {
    async fn create(
        &self,
        name: &str,
        schema: Option<&str>,
        version: Option<&str>,
    ) -> crate::Result<()> {
        let stmt = ExtensionStmt::create(name, schema, version);
        self.run(stmt, Operation::CreateExtension).await
    }

    async fn fetch(&self, name: &str) -> crate::Result<Option<InstalledExtension>> {
        let op = Operation::ReadExtension;
        let row = self
            .conn
            .traced(op)
            .extension(name)
            .query_opt(EXTENSION_READ_SQL, &[&name])
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(InstalledExtension {
            name: row.try_get(0).map_err(|e| Error::execution(op, e))?,
            schema: row.try_get(1).map_err(|e| Error::execution(op, e))?,
            version: row.try_get(2).map_err(|e| Error::execution(op, e))?,
        }))
    }

    async fn exists(&self, name: &str) -> crate::Result<bool> {
        let row = self
            .conn
            .traced(Operation::CheckExtension)
            .extension(name)
            .query_opt(EXTENSION_EXISTS_SQL, &[&name])
            .await?;
        Ok(row.is_some())
    }

    async fn relocate(&self, name: &str, schema: &str) -> crate::Result<()> {
        let stmt = ExtensionStmt::set_schema(name, schema);
        self.run(stmt, Operation::UpdateExtensionSchema).await
    }

    async fn reversion(&self, name: &str, version: Option<&str>) -> crate::Result<()> {
        let stmt = ExtensionStmt::update(name, version);
        self.run(stmt, Operation::UpdateExtensionVersion).await
    }

    async fn drop_extension(&self, name: &str) -> crate::Result<()> {
        self.run(ExtensionStmt::drop(name), Operation::DeleteExtension)
            .await
    }
}

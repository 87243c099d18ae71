//! Traced catalog round trips.
//!
//! The gateway never talks to a connection directly. It asks for a
//! [`TracedConn`] tagged with the [`Operation`] it is performing (and the
//! extension it targets, when there is one), so every statement gets a
//! `catalog.*` debug span and every driver failure comes back already
//! wrapped as [`Error::Execution`].

use std::future::Future;
use std::pin::Pin;

use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use tracing::Instrument;
use tracing::field::Empty;

use crate::error::{Error, Operation};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
type DbResult<T> = Result<T, tokio_postgres::Error>;

/// Something the catalog gateway can send statements to.
///
/// DDL is always sent as fully rendered text with no bind parameters;
/// catalog reads bind the extension name.
pub trait Connection: Send + Sync {
    /// Run a DDL statement, returning the number of rows affected.
    fn execute<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, DbResult<u64>>;

    /// Run a catalog query that matches at most one row.
    fn query_opt<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, DbResult<Option<Row>>>;

    /// Run a catalog query that always returns one row.
    fn query_one<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, DbResult<Row>>;
}

impl Connection for tokio_postgres::Client {
    fn execute<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, DbResult<u64>> {
        Box::pin(tokio_postgres::Client::execute(self, sql, &[]))
    }

    fn query_opt<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, DbResult<Option<Row>>> {
        Box::pin(tokio_postgres::Client::query_opt(self, sql, params))
    }

    fn query_one<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, DbResult<Row>> {
        Box::pin(tokio_postgres::Client::query_one(self, sql, &[]))
    }
}

/// A pooled connection behaves like the client it wraps.
impl Connection for deadpool_postgres::Object {
    fn execute<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, DbResult<u64>> {
        let client: &tokio_postgres::Client = self;
        Connection::execute(client, sql)
    }

    fn query_opt<'a>(
        &'a self,
        sql: &'a str,
        params: &'a [&'a (dyn ToSql + Sync)],
    ) -> BoxFuture<'a, DbResult<Option<Row>>> {
        let client: &tokio_postgres::Client = self;
        Connection::query_opt(client, sql, params)
    }

    fn query_one<'a>(&'a self, sql: &'a str) -> BoxFuture<'a, DbResult<Row>> {
        let client: &tokio_postgres::Client = self;
        Connection::query_one(client, sql)
    }
}

/// One catalog operation's view of a connection.
pub struct TracedConn<'a, C: Connection> {
    conn: &'a C,
    op: Operation,
    extension: Option<&'a str>,
}

impl<'a, C: Connection> TracedConn<'a, C> {
    pub fn new(conn: &'a C, op: Operation) -> Self {
        Self {
            conn,
            op,
            extension: None,
        }
    }

    /// Tag the spans with the extension being managed.
    pub fn extension(mut self, name: &'a str) -> Self {
        self.extension = Some(name);
        self
    }

    /// Send a DDL statement.
    pub async fn execute(&self, sql: &str) -> crate::Result<u64> {
        let span = tracing::debug_span!(
            "catalog.execute",
            op = %self.op,
            extension = self.extension,
            sql = %sql,
            affected = Empty,
        );
        let affected = self
            .conn
            .execute(sql)
            .instrument(span.clone())
            .await
            .map_err(|e| self.fail(&span, e))?;
        span.record("affected", affected);
        Ok(affected)
    }

    /// Look up at most one catalog row.
    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> crate::Result<Option<Row>> {
        let span = tracing::debug_span!(
            "catalog.query",
            op = %self.op,
            extension = self.extension,
            sql = %sql,
            found = Empty,
        );
        let row = self
            .conn
            .query_opt(sql, params)
            .instrument(span.clone())
            .await
            .map_err(|e| self.fail(&span, e))?;
        span.record("found", row.is_some());
        Ok(row)
    }

    /// Fetch a row that must exist, such as a `SHOW` result.
    pub async fn query_one(&self, sql: &str) -> crate::Result<Row> {
        let span = tracing::debug_span!(
            "catalog.query",
            op = %self.op,
            extension = self.extension,
            sql = %sql,
            found = true,
        );
        self.conn
            .query_one(sql)
            .instrument(span.clone())
            .await
            .map_err(|e| self.fail(&span, e))
    }

    fn fail(&self, span: &tracing::Span, e: tokio_postgres::Error) -> Error {
        span.in_scope(|| tracing::debug!(error = %e, "statement failed"));
        Error::execution(self.op, e)
    }
}

/// Open a [`TracedConn`] for one operation.
pub trait ConnectionExt: Connection + Sized {
    fn traced(&self, op: Operation) -> TracedConn<'_, Self> {
        TracedConn::new(self, op)
    }
}

impl<C: Connection> ConnectionExt for C {}


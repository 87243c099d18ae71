//! In-memory catalog that records every statement it is asked to run.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use pgdecl_sql::{EXTENSION_EXISTS_SQL, EXTENSION_READ_SQL, ExtensionStmt, render};

use super::ExtensionCatalog;
use crate::error::{BoxError, Error, Operation};
use crate::extension::InstalledExtension;

/// One entry in the statement log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Event {
    Begin(String),
    End(String),
}

#[derive(Default)]
struct State {
    /// name -> versions, default version last
    available: BTreeMap<String, Vec<String>>,
    schemas: BTreeSet<String>,
    installed: BTreeMap<String, InstalledExtension>,
    events: Vec<Event>,
}

pub(crate) struct FakeCatalog {
    state: Mutex<State>,
    latency: Duration,
}

impl FakeCatalog {
    pub(crate) fn new() -> Self {
        let mut state = State::default();
        for (name, versions) in [
            ("hstore", &["1.7", "1.8"][..]),
            ("pgcrypto", &["1.2", "1.3"][..]),
            ("citext", &["1.5", "1.6"][..]),
        ] {
            state.available.insert(
                name.to_owned(),
                versions.iter().map(|v| v.to_string()).collect(),
            );
        }
        state.schemas.insert("public".to_owned());
        state.schemas.insert("app".to_owned());
        Self {
            state: Mutex::new(state),
            latency: Duration::ZERO,
        }
    }

    /// Sleep inside every operation so that concurrent callers would
    /// interleave if nothing serialised them.
    pub(crate) fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every statement started, in order.
    pub(crate) fn statements(&self) -> Vec<String> {
        self.state()
            .events
            .iter()
            .filter_map(|e| match e {
                Event::Begin(sql) => Some(sql.clone()),
                Event::End(_) => None,
            })
            .collect()
    }

    /// Statements that are not catalog reads.
    pub(crate) fn ddl(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|sql| !sql.starts_with("SELECT"))
            .collect()
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.state().events.clone()
    }

    pub(crate) fn clear_log(&self) {
        self.state().events.clear();
    }

    pub(crate) fn installed(&self, name: &str) -> Option<InstalledExtension> {
        self.state().installed.get(name).cloned()
    }

    /// Simulate somebody dropping the extension behind our back.
    pub(crate) fn remove_out_of_band(&self, name: &str) {
        self.state().installed.remove(name);
    }

    /// Run `apply` against the state between a logged begin and end.
    async fn step<T>(
        &self,
        sql: String,
        op: Operation,
        apply: impl FnOnce(&mut State) -> Result<T, String>,
    ) -> crate::Result<T> {
        self.state().events.push(Event::Begin(sql.clone()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = {
            let mut state = self.state();
            let result = apply(&mut state);
            state.events.push(Event::End(sql));
            result
        };
        result.map_err(|msg| Error::execution(op, BoxError::from(msg)))
    }
}

impl ExtensionCatalog for FakeCatalog {
    async fn create(
        &self,
        name: &str,
        schema: Option<&str>,
        version: Option<&str>,
    ) -> crate::Result<()> {
        let sql = render(&ExtensionStmt::create(name, schema, version));
        self.step(sql, Operation::CreateExtension, |state| {
            if state.installed.contains_key(name) {
                return Ok(());
            }
            let versions = state
                .available
                .get(name)
                .ok_or_else(|| format!("extension \"{name}\" is not available"))?;
            let version = match version {
                Some(v) if versions.iter().any(|have| have == v) => v.to_owned(),
                Some(v) => return Err(format!("extension \"{name}\" has no version \"{v}\"")),
                None => versions.last().cloned().unwrap_or_default(),
            };
            let schema = schema.unwrap_or("public");
            if !state.schemas.contains(schema) {
                return Err(format!("schema \"{schema}\" does not exist"));
            }
            state.installed.insert(
                name.to_owned(),
                InstalledExtension {
                    name: name.to_owned(),
                    schema: schema.to_owned(),
                    version,
                },
            );
            Ok(())
        })
        .await
    }

    async fn fetch(&self, name: &str) -> crate::Result<Option<InstalledExtension>> {
        self.step(EXTENSION_READ_SQL.to_owned(), Operation::ReadExtension, |state| {
            Ok(state.installed.get(name).cloned())
        })
        .await
    }

    async fn exists(&self, name: &str) -> crate::Result<bool> {
        self.step(EXTENSION_EXISTS_SQL.to_owned(), Operation::CheckExtension, |state| {
            Ok(state.installed.contains_key(name))
        })
        .await
    }

    async fn relocate(&self, name: &str, schema: &str) -> crate::Result<()> {
        let sql = render(&ExtensionStmt::set_schema(name, schema));
        self.step(sql, Operation::UpdateExtensionSchema, |state| {
            if !state.schemas.contains(schema) {
                return Err(format!("schema \"{schema}\" does not exist"));
            }
            let ext = state
                .installed
                .get_mut(name)
                .ok_or_else(|| format!("extension \"{name}\" does not exist"))?;
            ext.schema = schema.to_owned();
            Ok(())
        })
        .await
    }

    async fn reversion(&self, name: &str, version: Option<&str>) -> crate::Result<()> {
        let sql = render(&ExtensionStmt::update(name, version));
        self.step(sql, Operation::UpdateExtensionVersion, |state| {
            let versions = state.available.get(name).cloned().unwrap_or_default();
            let target = match version {
                Some(v) if versions.iter().any(|have| have == v) => v.to_owned(),
                Some(v) => return Err(format!("extension \"{name}\" has no version \"{v}\"")),
                None => versions.last().cloned().unwrap_or_default(),
            };
            let ext = state
                .installed
                .get_mut(name)
                .ok_or_else(|| format!("extension \"{name}\" does not exist"))?;
            ext.version = target;
            Ok(())
        })
        .await
    }

    async fn drop_extension(&self, name: &str) -> crate::Result<()> {
        let sql = render(&ExtensionStmt::drop(name));
        self.step(sql, Operation::DeleteExtension, |state| {
            state
                .installed
                .remove(name)
                .map(|_| ())
                .ok_or_else(|| format!("extension \"{name}\" does not exist"))
        })
        .await
    }
}

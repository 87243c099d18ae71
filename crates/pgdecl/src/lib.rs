//! Declarative management of PostgreSQL catalog objects.
//!
//! This crate provides:
//! - A [`Resource`] lifecycle (create, exists, read, update, delete, import)
//!   that a declarative driver uses to converge catalog objects
//! - [`ExtensionResource`], the lifecycle for `CREATE EXTENSION` objects
//! - A catalog gateway ([`ExtensionCatalog`], [`PgCatalog`]) that issues
//!   one statement per call, with every identifier quoted
//! - A per-database [`CatalogLock`] shared by all resource kinds
//! - Server version detection and feature gating ([`Capabilities`])
//!
//! # Drift
//!
//! Reads never fail because an object is missing. If someone drops an
//! extension out of band, the next [`Resource::read`] returns `None` and the
//! driver removes it from its state.
//!
//! # Partial updates
//!
//! An update that moves the schema and changes the version sends two
//! statements. If the second one fails the first is not undone; the error is
//! returned and the next read shows where the extension actually is.

mod capability;
mod catalog;
mod error;
mod extension;
mod lock;
pub mod pool;
mod resource;
mod traced;

pub use capability::{Capabilities, Feature, ServerVersion};
pub use catalog::{ExtensionCatalog, PgCatalog};
pub use error::{BoxError, Error, ErrorKind, Operation};
pub use extension::{Extension, ExtensionResource, InstalledExtension};
pub use lock::{CatalogLock, CatalogLocks};
pub use pool::Pool;
pub use resource::{Identity, Resource};
pub use traced::{Connection, ConnectionExt, TracedConn};

/// Result type for pgdecl operations.
pub type Result<T> = std::result::Result<T, Error>;

//! Declarative management of PostgreSQL extensions.
//!
//! [`ExtensionResource`] implements the [`Resource`] lifecycle on top of an
//! [`ExtensionCatalog`]. Every entry point:
//!
//! 1. refuses servers without extension support, before locking or sending SQL;
//! 2. takes the database's [`CatalogLock`] (shared for reads, exclusive
//!    otherwise) for the whole operation;
//! 3. after any change, reads the extension back so the returned state is what
//!    the catalog says, not what was asked for.
//!
//! ```ignore
//! let pool = pgdecl::Pool::connect(&database_url, 4)?;
//! let conn = pool.get().await?;
//! let capabilities = Capabilities::detect(&conn).await?;
//! let locks = CatalogLocks::new();
//!
//! let extensions = ExtensionResource::new(
//!     PgCatalog::new(conn),
//!     capabilities,
//!     locks.for_database(pool.database()),
//! );
//! let installed = extensions.create(&Extension::new("pgcrypto")).await?;
//! ```

use tracing::{info, warn};

use crate::capability::{Capabilities, Feature};
use crate::catalog::ExtensionCatalog;
use crate::error::Error;
use crate::lock::CatalogLock;
use crate::resource::{Identity, Resource};

/// Declared state of an extension.
///
/// `schema` and `version` are optional: when absent on create the server
/// default applies, and when absent on update that attribute is left alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub schema: Option<String>,
    /// An empty string on update means "the default version".
    pub version: Option<String>,
}

impl Extension {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            version: None,
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// An extension as recorded in `pg_catalog.pg_extension`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledExtension {
    pub name: String,
    pub schema: String,
    pub version: String,
}

impl Identity for InstalledExtension {
    fn id(&self) -> &str {
        &self.name
    }
}

impl From<InstalledExtension> for Extension {
    fn from(ext: InstalledExtension) -> Self {
        Self {
            name: ext.name,
            schema: Some(ext.schema),
            version: Some(ext.version),
        }
    }
}

impl From<&InstalledExtension> for Extension {
    fn from(ext: &InstalledExtension) -> Self {
        ext.clone().into()
    }
}

/// The statements an update needs, worked out before anything is sent.
#[derive(Debug, Default, PartialEq, Eq)]
struct UpdatePlan<'a> {
    schema: Option<&'a str>,
    /// `Some(None)` updates to the default version.
    version: Option<Option<&'a str>>,
}

impl UpdatePlan<'_> {
    fn is_empty(&self) -> bool {
        self.schema.is_none() && self.version.is_none()
    }
}

fn plan_update<'a>(
    id: &str,
    previous: &InstalledExtension,
    desired: &'a Extension,
) -> crate::Result<UpdatePlan<'a>> {
    if id != previous.name {
        return Err(Error::Validation(format!(
            "extension {id:?} does not match the observed extension {:?}",
            previous.name
        )));
    }
    if desired.name != previous.name {
        return Err(Error::Validation(format!(
            "extension {:?} cannot be renamed to {:?}; it must be recreated",
            previous.name, desired.name
        )));
    }

    let schema = match desired.schema.as_deref() {
        Some(s) if s == previous.schema => None,
        Some("") => {
            return Err(Error::Validation(
                "error setting extension schema to an empty string".to_owned(),
            ));
        }
        Some(s) => Some(s),
        None => None,
    };

    let version = match desired.version.as_deref() {
        Some(v) if v == previous.version => None,
        Some("") => Some(None),
        Some(v) => Some(Some(v)),
        None => None,
    };

    Ok(UpdatePlan { schema, version })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// The extension lifecycle against one database.
pub struct ExtensionResource<C> {
    catalog: C,
    capabilities: Capabilities,
    lock: CatalogLock,
}

impl<C: ExtensionCatalog> ExtensionResource<C> {
    /// `lock` should come from the [`CatalogLocks`](crate::CatalogLocks)
    /// registry shared by every resource kind on the same database.
    pub fn new(catalog: C, capabilities: Capabilities, lock: CatalogLock) -> Self {
        Self {
            catalog,
            capabilities,
            lock,
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    fn check_supported(&self) -> crate::Result<()> {
        self.capabilities.require(Feature::Extension)
    }

    /// Caller holds the catalog lock.
    async fn read_locked(&self, id: &str) -> crate::Result<Option<InstalledExtension>> {
        match self.catalog.fetch(id).await? {
            Some(ext) => Ok(Some(ext)),
            None => {
                warn!(extension = %id, "extension not found");
                Ok(None)
            }
        }
    }

    /// Update the extension to its default version, then read it back.
    pub async fn upgrade(&self, id: &str) -> crate::Result<Option<InstalledExtension>> {
        self.check_supported()?;
        let _guard = self.lock.write().await;

        self.catalog.reversion(id, None).await?;
        info!(extension = %id, "updated extension to default version");

        self.read_locked(id).await
    }
}

impl<C: ExtensionCatalog> Resource for ExtensionResource<C> {
    type Desired = Extension;
    type Observed = InstalledExtension;

    const KIND: &'static str = "extension";

    async fn create(&self, desired: &Extension) -> crate::Result<Option<InstalledExtension>> {
        self.check_supported()?;
        if desired.name.is_empty() {
            return Err(Error::Validation(
                "extension name must not be empty".to_owned(),
            ));
        }

        let _guard = self.lock.write().await;

        let name = desired.name.as_str();
        self.catalog
            .create(name, non_empty(&desired.schema), non_empty(&desired.version))
            .await?;
        info!(extension = %name, "created extension");

        self.read_locked(name).await
    }

    async fn exists(&self, id: &str) -> crate::Result<bool> {
        self.check_supported()?;
        // exclusive, so the answer can't race a concurrent create or drop
        let _guard = self.lock.write().await;

        self.catalog.exists(id).await
    }

    async fn read(&self, id: &str) -> crate::Result<Option<InstalledExtension>> {
        self.check_supported()?;
        let _guard = self.lock.read().await;

        self.read_locked(id).await
    }

    async fn update(
        &self,
        id: &str,
        previous: &InstalledExtension,
        desired: &Extension,
    ) -> crate::Result<Option<InstalledExtension>> {
        self.check_supported()?;
        let plan = plan_update(id, previous, desired)?;

        let _guard = self.lock.write().await;

        // Schema before version. A failed version update leaves the
        // relocation in place.
        if let Some(schema) = plan.schema {
            self.catalog.relocate(id, schema).await?;
            info!(extension = %id, %schema, "moved extension");
        }
        if let Some(version) = plan.version {
            self.catalog.reversion(id, version).await?;
            info!(extension = %id, version = version.unwrap_or("default"), "updated extension");
        }

        if plan.is_empty() {
            // nothing was sent, the last observation still stands
            return Ok(Some(previous.clone()));
        }

        self.read_locked(id).await
    }

    async fn delete(&self, id: &str) -> crate::Result<()> {
        self.check_supported()?;
        let _guard = self.lock.write().await;

        self.catalog.drop_extension(id).await?;
        info!(extension = %id, "dropped extension");
        Ok(())
    }
}

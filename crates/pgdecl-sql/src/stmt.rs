//! Extension DDL statements and catalog queries.

/// A DDL statement against one extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionStmt {
    Create(CreateExtension),
    SetSchema(SetExtensionSchema),
    Update(UpdateExtension),
    Drop(DropExtension),
}

/// `CREATE EXTENSION IF NOT EXISTS ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateExtension {
    pub name: String,
    pub schema: Option<String>,
    pub version: Option<String>,
}

/// `ALTER EXTENSION ... SET SCHEMA ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetExtensionSchema {
    pub name: String,
    pub schema: String,
}

/// `ALTER EXTENSION ... UPDATE [TO ...]`
///
/// Without a version the extension is updated to the default version named
/// by its control file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateExtension {
    pub name: String,
    pub version: Option<String>,
}

/// `DROP EXTENSION ...`
///
/// Never cascades: dependent objects make the drop fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropExtension {
    pub name: String,
}

// ============================================================================
// Builder-style constructors
// ============================================================================

impl CreateExtension {
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

impl ExtensionStmt {
    pub fn create(name: &str, schema: Option<&str>, version: Option<&str>) -> Self {
        ExtensionStmt::Create(CreateExtension {
            name: name.to_owned(),
            schema: schema.map(str::to_owned),
            version: version.map(str::to_owned),
        })
    }

    pub fn set_schema(name: &str, schema: &str) -> Self {
        ExtensionStmt::SetSchema(SetExtensionSchema {
            name: name.to_owned(),
            schema: schema.to_owned(),
        })
    }

    pub fn update(name: &str, version: Option<&str>) -> Self {
        ExtensionStmt::Update(UpdateExtension {
            name: name.to_owned(),
            version: version.map(str::to_owned),
        })
    }

    pub fn drop(name: &str) -> Self {
        ExtensionStmt::Drop(DropExtension {
            name: name.to_owned(),
        })
    }

    /// The extension this statement targets.
    pub fn name(&self) -> &str {
        match self {
            ExtensionStmt::Create(s) => &s.name,
            ExtensionStmt::SetSchema(s) => &s.name,
            ExtensionStmt::Update(s) => &s.name,
            ExtensionStmt::Drop(s) => &s.name,
        }
    }
}

// ============================================================================
// Catalog queries
// ============================================================================

/// Existence probe. `$1` is the extension name.
pub const EXTENSION_EXISTS_SQL: &str =
    "SELECT extname FROM pg_catalog.pg_extension WHERE extname = $1";

/// Full read of one extension with its schema resolved. `$1` is the
/// extension name. Columns: `extname`, `nspname`, `extversion`.
pub const EXTENSION_READ_SQL: &str = "SELECT e.extname, n.nspname, e.extversion \
     FROM pg_catalog.pg_extension e, pg_catalog.pg_namespace n \
     WHERE n.oid = e.extnamespace AND e.extname = $1";

/// Server version as an integer string, e.g. `160002`.
pub const SERVER_VERSION_NUM_SQL: &str = "SHOW server_version_num";

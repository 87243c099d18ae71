//! Server version detection and feature gating.
//!
//! The version is detected once per target, when the connection is set up.
//! After that, [`Capabilities::require`] is a pure check, so resource
//! operations can refuse an unsupported server without any round trip.

use std::fmt;

use pgdecl_sql::SERVER_VERSION_NUM_SQL;

use crate::error::{Error, Operation};
use crate::traced::{Connection, ConnectionExt};

/// A PostgreSQL server version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Decode `server_version_num`.
    ///
    /// Before 10 the number is `major * 10000 + minor * 100 + patch`
    /// (`90105` is 9.1.5). From 10 on there is no third component and it is
    /// `major * 10000 + minor` (`160002` is 16.2).
    pub const fn from_version_num(num: u32) -> Self {
        if num >= 100_000 {
            Self::new(num / 10_000, num % 10_000, 0)
        } else {
            Self::new(num / 10_000, (num / 100) % 100, num % 100)
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.major >= 10 {
            write!(f, "{}.{}", self.major, self.minor)
        } else {
            write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
        }
    }
}

/// Server-side capabilities a resource kind may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `CREATE EXTENSION` and `pg_catalog.pg_extension`.
    Extension,
}

impl Feature {
    /// The oldest server that has this feature.
    pub const fn min_version(self) -> ServerVersion {
        match self {
            Feature::Extension => ServerVersion::new(9, 1, 0),
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feature::Extension => f.write_str("postgresql_extension resource"),
        }
    }
}

/// The detected capability set of one target database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    version: ServerVersion,
}

impl Capabilities {
    pub const fn new(version: ServerVersion) -> Self {
        Self { version }
    }

    /// Ask the server for its version.
    pub async fn detect<C: Connection>(conn: &C) -> crate::Result<Self> {
        let row = conn
            .traced(Operation::DetectServerVersion)
            .query_one(SERVER_VERSION_NUM_SQL)
            .await?;
        let raw: String = row
            .try_get(0)
            .map_err(|e| Error::execution(Operation::DetectServerVersion, e))?;
        let num: u32 = raw
            .trim()
            .parse()
            .map_err(|e| Error::execution(Operation::DetectServerVersion, e))?;

        let version = ServerVersion::from_version_num(num);
        tracing::debug!(%version, "detected server version");
        Ok(Self::new(version))
    }

    pub fn version(&self) -> ServerVersion {
        self.version
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.version >= feature.min_version()
    }

    /// Fail with [`Error::UnsupportedFeature`] if `feature` is missing.
    pub fn require(&self, feature: Feature) -> crate::Result<()> {
        if self.supports(feature) {
            Ok(())
        } else {
            Err(Error::UnsupportedFeature {
                feature,
                version: self.version,
            })
        }
    }
}

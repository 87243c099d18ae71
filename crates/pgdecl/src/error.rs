use std::fmt;

use thiserror::Error;

use crate::capability::{Feature, ServerVersion};

/// Boxed underlying cause of an [`Error::Execution`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything a catalog operation can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{feature} is not supported for this Postgres version ({version})")]
    UnsupportedFeature {
        feature: Feature,
        version: ServerVersion,
    },

    #[error("{0}")]
    Validation(String),

    #[error("error {op}: {source}")]
    Execution {
        op: Operation,
        #[source]
        source: BoxError,
    },

    #[error("connection pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("invalid connection configuration: {0}")]
    Config(String),
}

impl Error {
    /// Wrap a driver (or catalog) failure with the sub-operation it came from.
    pub fn execution(op: Operation, source: impl Into<BoxError>) -> Self {
        Error::Execution {
            op,
            source: source.into(),
        }
    }

    /// Classify the error, e.g. to decide whether retrying can help.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Execution { .. } => ErrorKind::Execution,
            Error::Pool(_) | Error::Config(_) => ErrorKind::Connection,
        }
    }
}

/// Coarse classification of an [`Error`].
///
/// Not-found is deliberately absent: a missing catalog row is a normal
/// outcome and never surfaces as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The server is too old for the resource kind. Not retryable.
    UnsupportedFeature,
    /// Bad input, rejected before any SQL was sent.
    Validation,
    /// The server or driver rejected a statement.
    Execution,
    /// Could not obtain a connection.
    Connection,
}

/// The catalog sub-operation an [`Error::Execution`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateExtension,
    ReadExtension,
    CheckExtension,
    UpdateExtensionSchema,
    UpdateExtensionVersion,
    DeleteExtension,
    DetectServerVersion,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::CreateExtension => "creating extension",
            Operation::ReadExtension => "reading extension",
            Operation::CheckExtension => "checking extension",
            Operation::UpdateExtensionSchema => "updating extension schema",
            Operation::UpdateExtensionVersion => "updating extension version",
            Operation::DeleteExtension => "deleting extension",
            Operation::DetectServerVersion => "detecting server version",
        };
        f.write_str(s)
    }
}

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pgdecl(#[from] pgdecl::Error),

    #[error("extension {0:?} is not installed")]
    NotInstalled(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] farmsync_core::Error),
    #[error(transparent)]
    ClientConfig(#[from] farmsync_core::ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid record id: {0}")]
    InvalidId(String),
    #[error("Invalid field assignment '{0}', expected FIELD=VALUE")]
    InvalidAssignment(String),
    #[error("Nothing to update. Pass at least one --set FIELD=VALUE")]
    EmptyUpdate,
    #[error("{0} cannot be empty")]
    EmptyValue(&'static str),
    #[error("Password is required. Pass --password or pipe it on stdin")]
    MissingPassword,
}

//! Error taxonomy shared by the model, the netload assembler and the I/O adapters.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors surfaced by a pipeline run.
///
/// Every variant is fatal for the run. Small negative power values from the
/// physical model are not errors and never reach this type.
#[derive(Debug, Error)]
pub enum NetloadError {
    /// Invalid or unknown configuration (model keys, coordinates, capacities).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Input data does not honour its contract (missing columns, bad timestamps,
    /// empty or non-monotonic series).
    #[error("data contract violation: {0}")]
    DataContract(String),

    #[error("cannot access \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl NetloadError {
    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Self::DataContract(message.into())
    }

    pub(crate) fn config(field: &str, message: impl Into<String>) -> Self {
        Self::Config(ConfigError::new(field, message))
    }
}

pub type Result<T> = std::result::Result<T, NetloadError>;

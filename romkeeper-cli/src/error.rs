use thiserror::Error;

use romkeeper_dat::CatalogError;
use romkeeper_lib::{ExportError, PatchError};

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Catalog could not be found or loaded
    #[error("{0}")]
    Catalog(#[from] CatalogError),

    #[error("{0}")]
    Export(#[from] ExportError),

    #[error("{0}")]
    Patch(#[from] PatchError),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// The user declined a destructive step
    #[error("Aborted")]
    Aborted,
}

impl CliError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

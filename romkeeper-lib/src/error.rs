use romkeeper_dat::CatalogError;
use thiserror::Error;

/// Errors that can occur while applying a patch.
#[derive(Debug, Error)]
pub enum PatchError {
    /// I/O error while reading the patch or writing the target
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The patch does not start with the IPS magic
    #[error("Invalid patch format: {0}")]
    InvalidFormat(String),
}

impl PatchError {
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

/// Errors that can occur while exporting or patching library content.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The patch list document is missing a required element
    #[error("Invalid patch list: {0}")]
    PatchList(String),
}

impl ExportError {
    pub fn patch_list(msg: impl Into<String>) -> Self {
        Self::PatchList(msg.into())
    }
}

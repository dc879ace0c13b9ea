use thiserror::Error;

/// Errors raised while interpreting catalog vocabulary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The `licensed` code is not one of the known classes
    #[error("Unknown license code: {0}")]
    UnknownLicense(String),
}

impl CoreError {
    pub fn unknown_license(code: impl Into<String>) -> Self {
        Self::UnknownLicense(code.into())
    }
}

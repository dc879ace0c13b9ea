use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// License classification of a catalog record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum License {
    Licensed,
    Unlicensed,
    Pirate,
    Homebrew,
}

impl License {
    /// Resolve the catalog's nullable `licensed` code.
    ///
    /// An absent code means the record is licensed.
    pub fn from_code(code: Option<&str>) -> Result<Self, CoreError> {
        match code.map(str::trim) {
            None => Ok(Self::Licensed),
            Some("0") => Ok(Self::Unlicensed),
            Some("1") => Ok(Self::Licensed),
            Some("2") => Ok(Self::Pirate),
            Some("3") => Ok(Self::Homebrew),
            Some(other) => Err(CoreError::unknown_license(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Licensed => "Licensed",
            Self::Unlicensed => "Unlicensed",
            Self::Pirate => "Pirate",
            Self::Homebrew => "Homebrew",
        }
    }

    pub fn is_licensed(&self) -> bool {
        matches!(self, Self::Licensed)
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

//! Error types for the geography module.

use rb_security::GeographicLevel;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeographyError {
    /// A geo pointer names a row that does not exist. Upstream data is
    /// corrupt; never treated as "no scope".
    #[error("dangling {pointer} reference '{code}'")]
    DanglingReference {
        pointer: GeographicLevel,
        code: String,
    },

    /// Reference data failed validation.
    #[error("invalid geography dataset: {0}")]
    InvalidDataset(String),

    /// Reference data could not be loaded.
    #[error("geography unavailable: {0}")]
    Unavailable(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GeographyError {
    #[must_use]
    pub fn dangling(pointer: GeographicLevel, code: &str) -> Self {
        Self::DanglingReference {
            pointer,
            code: code.to_owned(),
        }
    }
}

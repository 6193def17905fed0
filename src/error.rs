//! Error taxonomy shared by every dictionary.
//!
//! Lookups and removals of absent keys are not errors; they return `None`.
//! Corrupted internal state is not an error either: it panics.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DictionaryError {
    /// Construction input that no dictionary can honor.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DictionaryError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DictionaryError::InvalidArgument(msg.into())
    }
}

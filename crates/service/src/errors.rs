use thiserror::Error;

use crate::storage::StoreError;

/// Why a raw word or message was refused before reaching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("input cannot be empty")]
    EmptyInput,
    #[error("only a single word can be posted")]
    MultiWordInput,
    #[error("word must be at least 2 characters long")]
    TooShort,
}

impl Rejection {
    /// Stable snake_case name, used as a metrics label and log field.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::EmptyInput => "empty_input",
            Rejection::MultiWordInput => "multi_word_input",
            Rejection::TooShort => "too_short",
        }
    }
}

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Invalid(#[from] Rejection),
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
}

impl RecordError {
    pub fn is_validation(&self) -> bool {
        matches!(self, RecordError::Invalid(_))
    }
}

impl From<StoreError> for RecordError {
    fn from(e: StoreError) -> Self {
        RecordError::StoreUnavailable(e.to_string())
    }
}

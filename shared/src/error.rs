//! Domain rule violations raised by the ledger engines

use thiserror::Error;

/// Errors produced by ledger rules, independent of storage or transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed, missing or out-of-range input
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    /// The entity exists but belongs to another owner
    #[error("{0} belongs to another account")]
    Forbidden(&'static str),

    #[error("{0}")]
    InvalidState(String),
}

impl LedgerError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

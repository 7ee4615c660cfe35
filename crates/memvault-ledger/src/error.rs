//! Ledger error taxonomy.
//!
//! Each variant maps to exactly one client-visible outcome; the HTTP layer
//! does that mapping without inspecting messages.

use memvault_domain::{ExternalIdError, StoreError, ValidationError};
use thiserror::Error;

/// Errors surfaced by ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A field value is malformed or out of policy; the offending field is
    /// named where known
    #[error("{message}")]
    Validation {
        /// Name of the offending field
        field: &'static str,
        /// Human-readable description
        message: String,
    },

    /// Malformed identifier or malformed request shape
    #[error("{0}")]
    BadRequest(String),

    /// The uniqueness triple already exists
    #[error("{0}")]
    Conflict(String),

    /// Well-formed but unknown identifier
    #[error("{0}")]
    NotFound(String),

    /// Unexpected failure; detail is logged server-side, callers get an
    /// opaque message
    #[error("{0}")]
    Internal(String),
}

impl From<ValidationError> for LedgerError {
    fn from(e: ValidationError) -> Self {
        LedgerError::Validation {
            field: e.field,
            message: e.message,
        }
    }
}

impl From<ExternalIdError> for LedgerError {
    fn from(e: ExternalIdError) -> Self {
        LedgerError::BadRequest(e.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => LedgerError::Conflict("Duplicate fact detected".to_string()),
            StoreError::InvalidData(msg) | StoreError::Backend(msg) => LedgerError::Internal(msg),
        }
    }
}

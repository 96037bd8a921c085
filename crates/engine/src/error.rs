//! Engine error type.
//!
//! Every command returns a typed failure; nothing is swallowed and the
//! engine never formats user-facing text beyond the error messages.

use thiserror::Error;

use mutuo_core::ledger::LedgerError;
use mutuo_core::workflow::WorkflowError;
use mutuo_store::StoreError;

/// Result type alias for engine commands.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced at the command boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Ledger rule violation (insufficient funds, blocked account, ...).
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Workflow rule violation (invalid transition, exceeds remaining, ...).
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Store failure (not found, duplicate key, retry exhaustion).
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Ledger(e) => e.error_code(),
            Self::Workflow(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::Ledger(LedgerError::ZeroAmount | LedgerError::NegativeAmount) => 400,
            Self::Ledger(_) => 422,
            Self::Workflow(
                WorkflowError::InvalidAmount
                | WorkflowError::UtrRequired
                | WorkflowError::UpiRequired
                | WorkflowError::RejectionReasonRequired
                | WorkflowError::CodeRequired
                | WorkflowError::InvalidStock
                | WorkflowError::Schedule(_),
            ) => 400,
            Self::Workflow(_) => 422,
            Self::Store(StoreError::NotFound { .. }) => 404,
            Self::Store(_) => 409,
        }
    }

    /// Returns true if the caller may retry the command as-is.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Conflict | StoreError::RetriesExhausted { .. })
        )
    }
}

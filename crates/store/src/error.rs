//! Store error types.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document not found.
    #[error("{collection} not found: {key}")]
    NotFound {
        /// Collection name.
        collection: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// A document with this key already exists.
    #[error("{collection} already contains key {key}")]
    DuplicateKey {
        /// Collection name.
        collection: &'static str,
        /// The conflicting key.
        key: String,
    },

    /// A document read by the transaction was modified before commit.
    /// Internal: `Store::run` retries on this.
    #[error("Concurrent modification detected, please retry")]
    Conflict,

    /// Transaction retry budget exhausted.
    #[error("Transaction aborted after {attempts} conflicting attempts")]
    RetriesExhausted {
        /// How many attempts were made.
        attempts: u32,
    },
}

impl StoreError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::DuplicateKey { .. } => "DUPLICATE_KEY",
            Self::Conflict => "CONCURRENT_MODIFICATION",
            Self::RetriesExhausted { .. } => "CONCURRENCY_CONFLICT",
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = StoreError::NotFound {
            collection: "accounts",
            key: "abc".to_string(),
        };
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert_eq!(StoreError::Conflict.error_code(), "CONCURRENT_MODIFICATION");
        assert_eq!(
            StoreError::RetriesExhausted { attempts: 5 }.error_code(),
            "CONCURRENCY_CONFLICT"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(StoreError::Conflict.is_retryable());
        assert!(!StoreError::RetriesExhausted { attempts: 1 }.is_retryable());
        assert!(
            !StoreError::DuplicateKey {
                collection: "coupons",
                key: "WELCOME".to_string(),
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_display() {
        let err = StoreError::NotFound {
            collection: "deposits",
            key: "d-1".to_string(),
        };
        assert_eq!(err.to_string(), "deposits not found: d-1");
    }
}

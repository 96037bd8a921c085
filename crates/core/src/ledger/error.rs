//! Ledger error types.

use thiserror::Error;

use mutuo_shared::types::{Money, UserId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Amount cannot be zero.
    #[error("Amount cannot be zero")]
    ZeroAmount,

    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Debit exceeds the wallet balance.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// The amount the debit asked for.
        requested: Money,
        /// The wallet balance at the time of the debit.
        available: Money,
    },

    /// The account is blocked and cannot move funds.
    #[error("Account {0} is blocked")]
    AccountBlocked(UserId),

    /// Balance arithmetic overflowed the minor-unit range.
    #[error("Balance overflow on account {0}")]
    BalanceOverflow(UserId),
}

impl LedgerError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroAmount => "ZERO_AMOUNT",
            Self::NegativeAmount => "NEGATIVE_AMOUNT",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::AccountBlocked(_) => "ACCOUNT_BLOCKED",
            Self::BalanceOverflow(_) => "BALANCE_OVERFLOW",
        }
    }
}

//! Workflow error types.
//!
//! Every state machine in this module reports failed transitions and
//! violated business rules through [`WorkflowError`]. The engine maps
//! these to typed failures at the command boundary; no user-facing text
//! is produced here beyond the error messages themselves.

use thiserror::Error;

use mutuo_shared::types::Money;

use crate::schedule::ScheduleError;

/// Errors that can occur during workflow transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Attempted an invalid status transition.
    #[error("Invalid {entity} transition from {from} to {to}")]
    InvalidTransition {
        /// Which entity refused the transition.
        entity: &'static str,
        /// The current status.
        from: &'static str,
        /// The attempted target status.
        to: &'static str,
    },

    /// Amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// A deposit needs its bank transfer reference.
    #[error("UTR number is required")]
    UtrRequired,

    /// A withdrawal needs a payout destination.
    #[error("UPI ID is required")]
    UpiRequired,

    /// Rejection reason is required but not provided.
    #[error("Rejection reason is required")]
    RejectionReasonRequired,

    /// The user already has an open loan request or running loan.
    #[error("Borrower already has an open loan request or running loan")]
    BorrowerNotEligible,

    /// The plan does not offer the chosen repayment method.
    #[error("Repayment method {method} is not offered by this plan")]
    MethodNotOffered {
        /// The requested method.
        method: &'static str,
    },

    /// Payment, investment, or payout larger than the allowed remainder.
    #[error("Amount {requested} exceeds the remaining {remaining}")]
    ExceedsRemaining {
        /// The requested amount.
        requested: Money,
        /// What is still allowed.
        remaining: Money,
    },

    /// Payout would overdraw the investor's pro-rata entitlement.
    #[error("Payout {requested} exceeds the investor's remaining entitlement {entitlement}")]
    ExceedsEntitlement {
        /// The requested payout.
        requested: Money,
        /// The investor's remaining entitlement.
        entitlement: Money,
    },

    /// The investor holds no stake in this plan.
    #[error("Investor has no investment in this plan")]
    NoInvestment,

    /// The user already redeemed this coupon.
    #[error("Coupon already redeemed by this user")]
    AlreadyRedeemed,

    /// The coupon stock is used up.
    #[error("Coupon stock is depleted")]
    Depleted,

    /// A coupon needs a non-empty code.
    #[error("Coupon code is required")]
    CodeRequired,

    /// A coupon needs at least one unit of stock.
    #[error("Coupon stock must be at least one")]
    InvalidStock,

    /// The loan is not past its due date yet.
    #[error("Loan is not past its due date")]
    NotYetDue,

    /// Schedule computation failed.
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
}

impl WorkflowError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "INVALID_STATE_TRANSITION",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::UtrRequired => "UTR_REQUIRED",
            Self::UpiRequired => "UPI_REQUIRED",
            Self::RejectionReasonRequired => "REJECTION_REASON_REQUIRED",
            Self::BorrowerNotEligible => "BORROWER_NOT_ELIGIBLE",
            Self::MethodNotOffered { .. } => "METHOD_NOT_OFFERED",
            Self::ExceedsRemaining { .. } => "EXCEEDS_REMAINING",
            Self::ExceedsEntitlement { .. } => "EXCEEDS_ENTITLEMENT",
            Self::NoInvestment => "NO_INVESTMENT",
            Self::AlreadyRedeemed => "ALREADY_REDEEMED",
            Self::Depleted => "DEPLETED",
            Self::CodeRequired => "CODE_REQUIRED",
            Self::InvalidStock => "INVALID_STOCK",
            Self::NotYetDue => "NOT_YET_DUE",
            Self::Schedule(e) => e.error_code(),
        }
    }
}

//! Per-domain workflow state machines.
//!
//! Every money-moving transition in the platform is a named operation
//! on one of these types: state in, validated new state out, and an
//! `InvalidTransition` (or a more specific rule error) otherwise. The
//! engine persists the returned values together with their ledger
//! entries in one store transaction.
//!
//! # Modules
//!
//! - `types` - Shared review statuses
//! - `error` - Workflow error types
//! - `deposit` - Deposit requests (pending → approved | rejected)
//! - `withdrawal` - Withdrawal requests with escrow and refund
//! - `loan` - Loan plans, requests, and active loans with EMI schedules
//! - `group` - Group loan funding, repayment, and payout distribution
//! - `coupon` - Coupon redemption with stock tracking

pub mod coupon;
pub mod deposit;
pub mod error;
pub mod group;
pub mod loan;
pub mod types;
pub mod withdrawal;

#[cfg(test)]
mod group_props;

pub use coupon::{Coupon, CouponStatus, Redemption};
pub use deposit::DepositRequest;
pub use error::WorkflowError;
pub use group::{
    GroupDistribution, GroupLoanPlan, GroupPlanStatus, Investment, Payout, Repayment,
    RepaymentStatus,
};
pub use loan::{
    ActiveLoan, Emi, EmiStatus, LoanPlan, LoanRequest, LoanRequestStatus, LoanStatus,
    RepaymentMethod,
};
pub use types::RequestStatus;
pub use withdrawal::WithdrawalRequest;

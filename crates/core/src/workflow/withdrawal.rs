//! Withdrawal request state machine.
//!
//! Funds leave the wallet at request time (escrow). Approval therefore
//! moves no money; rejection must refund exactly the escrowed amount.
//! Both decisions require the request to still be pending, which is the
//! double-refund guard.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mutuo_shared::types::{Money, UserId, WithdrawalId};

use super::error::WorkflowError;
use super::types::RequestStatus;

/// A withdrawal request with its amount held in escrow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Unique identifier.
    pub id: WithdrawalId,
    /// The withdrawing user.
    pub user_id: UserId,
    /// Escrowed amount.
    pub amount: Money,
    /// Payout destination.
    pub upi_id: String,
    /// Review status.
    pub status: RequestStatus,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the admin decided, if decided.
    pub decided_at: Option<DateTime<Utc>>,
}

impl WithdrawalRequest {
    /// Creates a new pending withdrawal request.
    ///
    /// The caller must debit the escrow in the same transaction that
    /// persists the request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for non-positive amounts and
    /// `UpiRequired` for an empty destination.
    pub fn new(
        user_id: UserId,
        amount: Money,
        upi_id: String,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if upi_id.trim().is_empty() {
            return Err(WorkflowError::UpiRequired);
        }
        Ok(Self {
            id: WithdrawalId::new(),
            user_id,
            amount,
            upi_id,
            status: RequestStatus::Pending,
            created_at: at,
            decided_at: None,
        })
    }

    /// Approves a pending request. The escrow already left the wallet,
    /// so there is no further ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the request is pending.
    pub fn approve(mut self, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if !self.status.is_pending() {
            return Err(WorkflowError::InvalidTransition {
                entity: "withdrawal",
                from: self.status.as_str(),
                to: RequestStatus::Approved.as_str(),
            });
        }
        self.status = RequestStatus::Approved;
        self.decided_at = Some(at);
        Ok(self)
    }

    /// Rejects a pending request.
    ///
    /// The caller must refund the escrowed amount in the same
    /// transaction; the pending-only check makes that refund happen at
    /// most once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the request is pending.
    pub fn reject(mut self, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if !self.status.is_pending() {
            return Err(WorkflowError::InvalidTransition {
                entity: "withdrawal",
                from: self.status.as_str(),
                to: RequestStatus::Rejected.as_str(),
            });
        }
        self.status = RequestStatus::Rejected;
        self.decided_at = Some(at);
        Ok(self)
    }
}

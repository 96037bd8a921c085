//! Deposit request state machine.
//!
//! A user submits proof of a bank transfer (amount + UTR); an admin
//! approves or rejects it. Approval is the only path that credits the
//! wallet, and only ever once: re-deciding a decided request fails.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mutuo_shared::types::{DepositId, Money, UserId};

use super::error::WorkflowError;
use super::types::RequestStatus;

/// A pending bank-transfer deposit awaiting admin review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositRequest {
    /// Unique identifier.
    pub id: DepositId,
    /// The depositing user.
    pub user_id: UserId,
    /// Claimed transfer amount.
    pub amount: Money,
    /// Bank transfer reference submitted as proof.
    pub utr: String,
    /// Review status.
    pub status: RequestStatus,
    /// When the request was submitted.
    pub created_at: DateTime<Utc>,
    /// When the admin decided, if decided.
    pub decided_at: Option<DateTime<Utc>>,
}

impl DepositRequest {
    /// Creates a new pending deposit request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for non-positive amounts and
    /// `UtrRequired` for an empty reference.
    pub fn new(
        user_id: UserId,
        amount: Money,
        utr: String,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if utr.trim().is_empty() {
            return Err(WorkflowError::UtrRequired);
        }
        Ok(Self {
            id: DepositId::new(),
            user_id,
            amount,
            utr,
            status: RequestStatus::Pending,
            created_at: at,
            decided_at: None,
        })
    }

    /// Approves a pending request.
    ///
    /// The caller must credit the wallet in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the request is pending.
    pub fn approve(mut self, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if !self.status.is_pending() {
            return Err(WorkflowError::InvalidTransition {
                entity: "deposit",
                from: self.status.as_str(),
                to: RequestStatus::Approved.as_str(),
            });
        }
        self.status = RequestStatus::Approved;
        self.decided_at = Some(at);
        Ok(self)
    }

    /// Rejects a pending request. No ledger effect: nothing was escrowed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the request is pending.
    pub fn reject(mut self, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if !self.status.is_pending() {
            return Err(WorkflowError::InvalidTransition {
                entity: "deposit",
                from: self.status.as_str(),
                to: RequestStatus::Rejected.as_str(),
            });
        }
        self.status = RequestStatus::Rejected;
        self.decided_at = Some(at);
        Ok(self)
    }
}

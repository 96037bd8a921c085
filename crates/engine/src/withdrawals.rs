//! Withdrawal request commands.
//!
//! The escrow debit happens at request creation, in the same
//! transaction that persists the request: a failed debit leaves no
//! request behind, and a rejected request refunds exactly once.

use chrono::Utc;
use tracing::info;

use mutuo_core::ledger::EntryKind;
use mutuo_core::workflow::WithdrawalRequest;
use mutuo_shared::types::{Money, UserId, WithdrawalId};
use mutuo_store::StoreError;

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Reads a withdrawal request.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn withdrawal(&self, id: WithdrawalId) -> EngineResult<WithdrawalRequest> {
        self.data.withdrawals.snapshot(&id).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.withdrawals.name(),
                key: id.to_string(),
            }
            .into()
        })
    }

    /// Submits a withdrawal request, debiting the escrow immediately.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` without creating the request, or the
    /// usual validation failures.
    pub fn create_withdrawal(
        &self,
        user_id: UserId,
        amount: Money,
        upi_id: String,
    ) -> EngineResult<WithdrawalRequest> {
        let now = Utc::now();
        let request = self.data.store.run(|txn| {
            let account = txn.get_required(&self.data.accounts, &user_id)?;
            let request = WithdrawalRequest::new(user_id, amount, upi_id.clone(), now)?;
            self.post_debit(
                txn,
                &account,
                amount,
                EntryKind::Withdrawal,
                request.id.into_inner(),
                now,
            )?;
            txn.insert(&self.data.withdrawals, request.id, request.clone())?;
            Ok::<_, EngineError>(request)
        })?;
        info!(withdrawal_id = %request.id, user_id = %user_id, amount = %amount, "withdrawal requested, escrow debited");
        Ok(request)
    }

    /// Approves a pending withdrawal. The escrow already left the
    /// wallet, so no further funds move.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if the request was already
    /// decided.
    pub fn approve_withdrawal(&self, id: WithdrawalId) -> EngineResult<WithdrawalRequest> {
        let now = Utc::now();
        let approved = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.withdrawals, &id)?;
            let approved = request.approve(now)?;
            txn.put(&self.data.withdrawals, id, approved.clone());
            Ok::<_, EngineError>(approved)
        })?;
        info!(withdrawal_id = %id, "withdrawal approved");
        Ok(approved)
    }

    /// Rejects a pending withdrawal and refunds the escrow, atomically.
    ///
    /// The pending-only guard in the state machine makes the refund
    /// happen at most once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if the request was already
    /// decided.
    pub fn reject_withdrawal(&self, id: WithdrawalId) -> EngineResult<WithdrawalRequest> {
        let now = Utc::now();
        let rejected = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.withdrawals, &id)?;
            let rejected = request.reject(now)?;
            let account = txn.get_required(&self.data.accounts, &rejected.user_id)?;
            self.post_credit(
                txn,
                &account,
                rejected.amount,
                EntryKind::WithdrawalReversal,
                id.into_inner(),
                now,
            )?;
            txn.put(&self.data.withdrawals, id, rejected.clone());
            Ok::<_, EngineError>(rejected)
        })?;
        info!(withdrawal_id = %id, amount = %rejected.amount, "withdrawal rejected, escrow refunded");
        Ok(rejected)
    }
}

//! Deposit request commands.

use chrono::Utc;
use tracing::info;

use mutuo_core::ledger::EntryKind;
use mutuo_core::workflow::DepositRequest;
use mutuo_shared::types::{DepositId, Money, UserId};
use mutuo_store::StoreError;

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Reads a deposit request.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn deposit(&self, id: DepositId) -> EngineResult<DepositRequest> {
        self.data.deposits.snapshot(&id).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.deposits.name(),
                key: id.to_string(),
            }
            .into()
        })
    }

    /// Submits a deposit request with its bank transfer reference.
    ///
    /// No funds move until approval.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account, `InvalidAmount`, or
    /// `UtrRequired`.
    pub fn create_deposit(
        &self,
        user_id: UserId,
        amount: Money,
        utr: String,
    ) -> EngineResult<DepositRequest> {
        let now = Utc::now();
        let request = self.data.store.run(|txn| {
            txn.get_required(&self.data.accounts, &user_id)?;
            let request = DepositRequest::new(user_id, amount, utr.clone(), now)?;
            txn.insert(&self.data.deposits, request.id, request.clone())?;
            Ok::<_, EngineError>(request)
        })?;
        info!(deposit_id = %request.id, user_id = %user_id, amount = %amount, "deposit requested");
        Ok(request)
    }

    /// Approves a pending deposit, crediting the wallet atomically with
    /// the status change.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if the request was already
    /// decided; the balance moves exactly once.
    pub fn approve_deposit(&self, id: DepositId) -> EngineResult<DepositRequest> {
        let now = Utc::now();
        let approved = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.deposits, &id)?;
            let approved = request.approve(now)?;
            let account = txn.get_required(&self.data.accounts, &approved.user_id)?;
            self.post_credit(
                txn,
                &account,
                approved.amount,
                EntryKind::Deposit,
                id.into_inner(),
                now,
            )?;
            txn.put(&self.data.deposits, id, approved.clone());
            Ok::<_, EngineError>(approved)
        })?;
        info!(deposit_id = %id, amount = %approved.amount, "deposit approved");
        Ok(approved)
    }

    /// Rejects a pending deposit. No ledger effect.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` if the request was already
    /// decided.
    pub fn reject_deposit(&self, id: DepositId) -> EngineResult<DepositRequest> {
        let now = Utc::now();
        let rejected = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.deposits, &id)?;
            let rejected = request.reject(now)?;
            txn.put(&self.data.deposits, id, rejected.clone());
            Ok::<_, EngineError>(rejected)
        })?;
        info!(deposit_id = %id, "deposit rejected");
        Ok(rejected)
    }
}

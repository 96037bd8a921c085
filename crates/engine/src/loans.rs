//! Loan plan, loan request, and active loan commands.

use chrono::Utc;
use tracing::info;

use mutuo_core::ledger::EntryKind;
use mutuo_core::schedule::DurationUnit;
use mutuo_core::workflow::{
    ActiveLoan, LoanPlan, LoanRequest, LoanStatus, RepaymentMethod, WorkflowError,
};
use mutuo_shared::types::{LoanId, LoanPlanId, LoanRequestId, Money, UserId};
use mutuo_store::StoreError;

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Reads a loan plan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn loan_plan(&self, id: LoanPlanId) -> EngineResult<LoanPlan> {
        self.data.loan_plans.snapshot(&id).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.loan_plans.name(),
                key: id.to_string(),
            }
            .into()
        })
    }

    /// Reads a loan request.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn loan_request(&self, id: LoanRequestId) -> EngineResult<LoanRequest> {
        self.data.loan_requests.snapshot(&id).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.loan_requests.name(),
                key: id.to_string(),
            }
            .into()
        })
    }

    /// Reads an active loan.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn loan(&self, id: LoanId) -> EngineResult<ActiveLoan> {
        self.data.loans.snapshot(&id).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.loans.name(),
                key: id.to_string(),
            }
            .into()
        })
    }

    /// Creates a loan plan.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` or `InvalidDuration` for bad parameters.
    #[allow(clippy::too_many_arguments)]
    pub fn create_loan_plan(
        &self,
        loan_amount: Money,
        interest: Money,
        tax: Money,
        duration: u32,
        duration_unit: DurationUnit,
        emi_allowed: bool,
        direct_allowed: bool,
    ) -> EngineResult<LoanPlan> {
        let plan = LoanPlan::new(
            loan_amount,
            interest,
            tax,
            duration,
            duration_unit,
            emi_allowed,
            direct_allowed,
            Utc::now(),
        )?;
        self.data.store.run(|txn| {
            txn.insert(&self.data.loan_plans, plan.id, plan.clone())?;
            Ok::<_, EngineError>(())
        })?;
        info!(plan_id = %plan.id, total_repayment = %plan.total_repayment, "loan plan created");
        Ok(plan)
    }

    /// Submits a loan request against a plan.
    ///
    /// A user may hold at most one open request or running loan; the
    /// marker on the account enforces that under concurrency.
    ///
    /// # Errors
    ///
    /// Returns `BorrowerNotEligible`, `MethodNotOffered`, or
    /// `EmiUnsupportedForDays`.
    pub fn submit_loan_request(
        &self,
        user_id: UserId,
        plan_id: LoanPlanId,
        method: RepaymentMethod,
    ) -> EngineResult<LoanRequest> {
        let now = Utc::now();
        let request = self.data.store.run(|txn| {
            let mut account = txn.get_required(&self.data.accounts, &user_id)?;
            if !account.is_loan_eligible() {
                return Err(WorkflowError::BorrowerNotEligible.into());
            }
            let plan = txn.get_required(&self.data.loan_plans, &plan_id)?;
            let request = LoanRequest::new(user_id, &plan, method, now)?;
            account.open_loan_request = Some(request.id);
            txn.put(&self.data.accounts, user_id, account);
            txn.insert(&self.data.loan_requests, request.id, request.clone())?;
            Ok::<_, EngineError>(request)
        })?;
        info!(request_id = %request.id, user_id = %user_id, method = %method, "loan requested");
        Ok(request)
    }

    /// Approves a pending loan request, opening the active loan with
    /// its due date and EMI schedule. No funds move; disbursement is
    /// recorded separately via [`Self::mark_loan_sent`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` on a decided request and
    /// `BorrowerNotEligible` if a loan is already running.
    pub fn approve_loan_request(&self, id: LoanRequestId) -> EngineResult<ActiveLoan> {
        let now = Utc::now();
        let loan = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.loan_requests, &id)?;
            let approved = request.approve(now)?;
            let mut account = txn.get_required(&self.data.accounts, &approved.user_id)?;
            if account.open_loan.is_some() {
                return Err(WorkflowError::BorrowerNotEligible.into());
            }
            let plan = txn.get_required(&self.data.loan_plans, &approved.plan_id)?;
            let loan = ActiveLoan::open(&approved, &plan, now)?;

            account.open_loan_request = None;
            account.open_loan = Some(loan.id);
            txn.put(&self.data.accounts, approved.user_id, account);
            txn.put(&self.data.loan_requests, id, approved);
            txn.insert(&self.data.loans, loan.id, loan.clone())?;
            Ok::<_, EngineError>(loan)
        })?;
        info!(
            request_id = %id,
            loan_id = %loan.id,
            total_payable = %loan.total_payable,
            emis = loan.emis.len(),
            "loan approved"
        );
        Ok(loan)
    }

    /// Rejects a pending loan request with a reason, restoring the
    /// user's eligibility.
    ///
    /// # Errors
    ///
    /// Returns `RejectionReasonRequired` or `InvalidStateTransition`.
    pub fn reject_loan_request(
        &self,
        id: LoanRequestId,
        reason: String,
    ) -> EngineResult<LoanRequest> {
        let now = Utc::now();
        let rejected = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.loan_requests, &id)?;
            let rejected = request.reject(reason.clone(), now)?;
            let mut account = txn.get_required(&self.data.accounts, &rejected.user_id)?;
            if account.open_loan_request == Some(id) {
                account.open_loan_request = None;
                txn.put(&self.data.accounts, rejected.user_id, account);
            }
            txn.put(&self.data.loan_requests, id, rejected.clone());
            Ok::<_, EngineError>(rejected)
        })?;
        info!(request_id = %id, "loan request rejected");
        Ok(rejected)
    }

    /// Confirms disbursement of an approved loan request.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStateTransition` unless the request is approved.
    pub fn mark_loan_sent(&self, id: LoanRequestId) -> EngineResult<LoanRequest> {
        let now = Utc::now();
        let sent = self.data.store.run(|txn| {
            let request = txn.get_required(&self.data.loan_requests, &id)?;
            let sent = request.mark_sent(now)?;
            txn.put(&self.data.loan_requests, id, sent.clone());
            Ok::<_, EngineError>(sent)
        })?;
        info!(request_id = %id, "loan disbursement confirmed");
        Ok(sent)
    }

    /// Records a borrower repayment: wallet debit, loan progress, and
    /// EMI bookkeeping, atomically. Completing the loan restores the
    /// user's eligibility.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds`, `ExceedsRemaining`, or `NotFound`
    /// when the loan does not belong to the user.
    pub fn record_loan_payment(
        &self,
        user_id: UserId,
        loan_id: LoanId,
        amount: Money,
    ) -> EngineResult<ActiveLoan> {
        let now = Utc::now();
        let loan = self.data.store.run(|txn| {
            let loan = txn.get_required(&self.data.loans, &loan_id)?;
            if loan.user_id != user_id {
                return Err(StoreError::NotFound {
                    collection: self.data.loans.name(),
                    key: loan_id.to_string(),
                }
                .into());
            }
            let account = txn.get_required(&self.data.accounts, &user_id)?;
            let loan = loan.record_payment(amount)?;
            let mut account = self.post_debit(
                txn,
                &account,
                amount,
                EntryKind::LoanRepayment,
                loan_id.into_inner(),
                now,
            )?;
            if loan.status == LoanStatus::Completed && account.open_loan == Some(loan_id) {
                account.open_loan = None;
                txn.put(&self.data.accounts, user_id, account);
            }
            txn.put(&self.data.loans, loan_id, loan.clone());
            Ok::<_, EngineError>(loan)
        })?;
        info!(
            loan_id = %loan_id,
            amount = %amount,
            remaining = %loan.remaining(),
            status = %loan.status,
            "loan payment recorded"
        );
        Ok(loan)
    }

    /// Flags a running loan whose due date has passed.
    ///
    /// # Errors
    ///
    /// Returns `NotYetDue` before the due date.
    pub fn mark_loan_due(&self, loan_id: LoanId) -> EngineResult<ActiveLoan> {
        let now = Utc::now();
        let loan = self.data.store.run(|txn| {
            let loan = txn.get_required(&self.data.loans, &loan_id)?;
            let loan = loan.mark_due(now)?;
            txn.put(&self.data.loans, loan_id, loan.clone());
            Ok::<_, EngineError>(loan)
        })?;
        info!(loan_id = %loan_id, "loan marked due");
        Ok(loan)
    }
}

//! Group loan commands: funding, repayment, payout distribution.

use chrono::Utc;
use tracing::{info, warn};

use mutuo_core::ledger::{EntryKind, LedgerEntry, LedgerService};
use mutuo_core::schedule::DurationUnit;
use mutuo_core::workflow::{GroupDistribution, GroupLoanPlan, RepaymentMethod};
use mutuo_shared::types::{GroupPlanId, Money, UserId};
use mutuo_store::StoreError;

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Reads a group loan plan with its sub-entities.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown id.
    pub fn group_plan(&self, id: GroupPlanId) -> EngineResult<GroupLoanPlan> {
        self.data.group_plans.snapshot(&id).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.group_plans.name(),
                key: id.to_string(),
            }
            .into()
        })
    }

    /// Creates a group loan plan open for funding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` or `InvalidDuration` for bad parameters.
    pub fn create_group_plan(
        &self,
        loan_amount: Money,
        interest: Money,
        repayment_type: RepaymentMethod,
        duration: u32,
        duration_unit: DurationUnit,
    ) -> EngineResult<GroupLoanPlan> {
        let plan = GroupLoanPlan::new(
            loan_amount,
            interest,
            repayment_type,
            duration,
            duration_unit,
            Utc::now(),
        )?;
        self.data.store.run(|txn| {
            txn.insert(&self.data.group_plans, plan.id, plan.clone())?;
            Ok::<_, EngineError>(())
        })?;
        info!(plan_id = %plan.id, loan_amount = %plan.loan_amount, "group plan created");
        Ok(plan)
    }

    /// Invests into a funding plan: wallet debit, stake upsert, funding
    /// progress, and the Funding → Active flip, atomically. The first
    /// investment of a referred user also pays the referrer's one-time
    /// bonus inside the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds`, `ExceedsRemaining`, or
    /// `InvalidStateTransition` once funding is closed.
    pub fn invest_in_group_loan(
        &self,
        plan_id: GroupPlanId,
        user_id: UserId,
        amount: Money,
    ) -> EngineResult<GroupLoanPlan> {
        let now = Utc::now();
        let bonus = Money::from_minor(self.config.referral_bonus_minor);
        let plan = self.data.store.run(|txn| {
            let plan = txn.get_required(&self.data.group_plans, &plan_id)?;
            let account = txn.get_required(&self.data.accounts, &user_id)?;
            let first_investment = account.total_investment.is_zero();

            let plan = plan.invest(user_id, amount)?;
            let mut account = self.post_debit(
                txn,
                &account,
                amount,
                EntryKind::GroupInvestment,
                plan_id.into_inner(),
                now,
            )?;
            account.total_investment += amount;

            // One-time referral bonus, guarded by the explicit marker
            // rather than by re-deriving "first investment" later.
            if first_investment && !account.referral_bonus_paid {
                if let Some(referrer) = account.referred_by {
                    if self.pay_referral_bonus(txn, referrer, user_id, bonus, now) {
                        account.referral_bonus_paid = true;
                    }
                }
            }

            txn.put(&self.data.accounts, user_id, account);
            txn.put(&self.data.group_plans, plan_id, plan.clone());
            Ok::<_, EngineError>(plan)
        })?;
        info!(
            plan_id = %plan_id,
            user_id = %user_id,
            amount = %amount,
            funded = %plan.amount_funded,
            status = %plan.status,
            "group investment recorded"
        );
        Ok(plan)
    }

    /// Credits the referrer's bonus inside the investment transaction.
    ///
    /// Returns false (and pays nothing) when the referrer account is
    /// missing, blocked, or the referral is circular; the investment
    /// itself still goes through.
    fn pay_referral_bonus<'s>(
        &'s self,
        txn: &mut mutuo_store::Txn<'s>,
        referrer: UserId,
        referred: UserId,
        bonus: Money,
        at: chrono::DateTime<Utc>,
    ) -> bool {
        if referrer == referred || !bonus.is_positive() {
            return false;
        }
        let Some(referrer_account) = txn.get(&self.data.accounts, &referrer) else {
            warn!(referrer = %referrer, "referrer account missing, skipping bonus");
            return false;
        };
        match LedgerService::credit(&referrer_account, bonus) {
            Ok(mut credited) => {
                let entry = LedgerEntry::credit(
                    referrer,
                    bonus,
                    EntryKind::ReferralBonus,
                    referred.into_inner(),
                    at,
                );
                if txn.insert(&self.data.ledger, entry.id, entry).is_err() {
                    return false;
                }
                credited.total_income += bonus;
                txn.put(&self.data.accounts, referrer, credited);
                info!(referrer = %referrer, referred = %referred, amount = %bonus, "referral bonus paid");
                true
            }
            Err(err) => {
                warn!(referrer = %referrer, error = %err, "skipping referral bonus");
                false
            }
        }
    }

    /// Records borrower cash received against an active plan. The cash
    /// pools as pending distribution; no wallet moves here.
    ///
    /// # Errors
    ///
    /// Returns `ExceedsRemaining` past the total repayment, or
    /// `InvalidStateTransition` on a plan that is not active.
    pub fn record_group_repayment(
        &self,
        plan_id: GroupPlanId,
        amount: Money,
    ) -> EngineResult<GroupLoanPlan> {
        let now = Utc::now();
        let plan = self.data.store.run(|txn| {
            let plan = txn.get_required(&self.data.group_plans, &plan_id)?;
            let plan = plan.record_repayment(amount, now)?;
            txn.put(&self.data.group_plans, plan_id, plan.clone());
            Ok::<_, EngineError>(plan)
        })?;
        info!(
            plan_id = %plan_id,
            amount = %amount,
            repaid = %plan.amount_repaid,
            distributable = %plan.distributable(),
            status = %plan.status,
            "group repayment recorded"
        );
        Ok(plan)
    }

    /// Distributes a payout to one investor: wallet credit, stake and
    /// audit updates, and oldest-first consumption of pending
    /// repayments, atomically across the two documents.
    ///
    /// # Errors
    ///
    /// Returns `ExceedsRemaining` against the distributable pool,
    /// `ExceedsEntitlement` past the investor's pro-rata share, or
    /// `NoInvestment`.
    pub fn distribute_group_payout(
        &self,
        plan_id: GroupPlanId,
        investor_id: UserId,
        amount: Money,
    ) -> EngineResult<GroupDistribution> {
        let now = Utc::now();
        let outcome = self.data.store.run(|txn| {
            let plan = txn.get_required(&self.data.group_plans, &plan_id)?;
            let account = txn.get_required(&self.data.accounts, &investor_id)?;
            let outcome = plan.distribute(investor_id, amount, now)?;
            let mut account = self.post_credit(
                txn,
                &account,
                amount,
                EntryKind::GroupPayout,
                plan_id.into_inner(),
                now,
            )?;
            account.total_income += amount;
            txn.put(&self.data.accounts, investor_id, account);
            txn.put(&self.data.group_plans, plan_id, outcome.plan.clone());
            Ok::<_, EngineError>(outcome)
        })?;
        if outcome.forfeited.is_positive() {
            warn!(
                plan_id = %plan_id,
                forfeited = %outcome.forfeited,
                "payout partially consumed a repayment; tail marked distributed"
            );
        }
        info!(
            plan_id = %plan_id,
            investor_id = %investor_id,
            amount = %amount,
            "group payout distributed"
        );
        Ok(outcome)
    }
}

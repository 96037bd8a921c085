//! Group loan plans: funding, repayment, and payout distribution.
//!
//! A plan is one aggregate document holding its investments, repayments,
//! and payouts, so every transition commits as a single write. Funding
//! fills the principal; the borrower's repayments pool up as
//! pending-distribution records; payouts consume that pool oldest-first
//! and credit investors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mutuo_shared::types::{GroupPlanId, Money, PayoutId, RepaymentId, UserId};

use super::error::WorkflowError;
use super::loan::RepaymentMethod;
use crate::allocation;
use crate::schedule::{DurationUnit, ScheduleError};

/// Status of a group loan plan.
///
/// Valid transitions:
/// - Funding → Active (principal fully funded)
/// - Active → Completed (total repayment received)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupPlanStatus {
    /// Collecting investor principal.
    Funding,
    /// Fully funded; borrower repaying.
    Active,
    /// Fully repaid; payouts may still be distributed.
    Completed,
}

impl GroupPlanStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Funding => "funding",
            Self::Active => "active",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for GroupPlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Distribution state of a borrower repayment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentStatus {
    /// Cash received, not yet paid out to investors.
    PendingDistribution,
    /// Consumed by a payout.
    Distributed,
}

/// One investor's stake in a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    /// The investing user.
    pub investor_id: UserId,
    /// Principal contributed so far.
    pub invested: Money,
    /// Payouts received so far.
    pub received: Money,
}

/// Borrower cash received, awaiting distribution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repayment {
    /// Unique identifier.
    pub id: RepaymentId,
    /// Amount received from the borrower.
    pub amount: Money,
    /// Distribution state.
    pub status: RepaymentStatus,
    /// When the cash arrived.
    pub received_at: DateTime<Utc>,
}

/// Immutable audit record of one investor payout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    /// Unique identifier.
    pub id: PayoutId,
    /// The investor credited.
    pub investor_id: UserId,
    /// Amount credited.
    pub amount: Money,
    /// When the payout was made.
    pub paid_at: DateTime<Utc>,
}

/// Outcome of a payout distribution.
#[derive(Debug, Clone)]
pub struct GroupDistribution {
    /// The plan with the payout applied.
    pub plan: GroupLoanPlan,
    /// The payout audit record (also stored on the plan).
    pub payout: Payout,
    /// Tail of the last consumed repayment not used by this payout.
    pub forfeited: Money,
}

/// A group loan plan and its sub-entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupLoanPlan {
    /// Unique identifier.
    pub id: GroupPlanId,
    /// Principal to raise from investors.
    pub loan_amount: Money,
    /// Interest the borrower pays on top.
    pub interest: Money,
    /// Principal + interest.
    pub total_repayment: Money,
    /// How the borrower repays.
    pub repayment_type: RepaymentMethod,
    /// Term length in `duration_unit`s.
    pub duration: u32,
    /// Calendar unit of the term.
    pub duration_unit: DurationUnit,
    /// Investor principal collected so far.
    pub amount_funded: Money,
    /// Borrower repayments received so far. Only ever increases.
    pub amount_repaid: Money,
    /// Plan status.
    pub status: GroupPlanStatus,
    /// One record per investor.
    pub investments: Vec<Investment>,
    /// Borrower repayments, oldest first.
    pub repayments: Vec<Repayment>,
    /// Immutable payout audit trail.
    pub payouts: Vec<Payout>,
    /// When the plan was created.
    pub created_at: DateTime<Utc>,
}

impl GroupLoanPlan {
    /// Creates a plan open for funding.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for a non-positive principal or negative
    /// interest, and `InvalidDuration` for a zero-length term.
    pub fn new(
        loan_amount: Money,
        interest: Money,
        repayment_type: RepaymentMethod,
        duration: u32,
        duration_unit: DurationUnit,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !loan_amount.is_positive() || interest.is_negative() {
            return Err(WorkflowError::InvalidAmount);
        }
        if duration == 0 {
            return Err(ScheduleError::InvalidDuration.into());
        }
        Ok(Self {
            id: GroupPlanId::new(),
            loan_amount,
            interest,
            total_repayment: loan_amount + interest,
            repayment_type,
            duration,
            duration_unit,
            amount_funded: Money::ZERO,
            amount_repaid: Money::ZERO,
            status: GroupPlanStatus::Funding,
            investments: Vec::new(),
            repayments: Vec::new(),
            payouts: Vec::new(),
            created_at: at,
        })
    }

    /// Principal still needed to fill the plan.
    #[must_use]
    pub fn remaining_funding(&self) -> Money {
        self.loan_amount - self.amount_funded
    }

    /// Borrower repayment still outstanding.
    #[must_use]
    pub fn remaining_repayment(&self) -> Money {
        self.total_repayment - self.amount_repaid
    }

    /// Sum of repayments not yet paid out to investors.
    #[must_use]
    pub fn distributable(&self) -> Money {
        self.repayments
            .iter()
            .filter(|r| r.status == RepaymentStatus::PendingDistribution)
            .map(|r| r.amount)
            .sum()
    }

    /// The given investor's stake, if any.
    #[must_use]
    pub fn investment_of(&self, investor_id: UserId) -> Option<&Investment> {
        self.investments
            .iter()
            .find(|i| i.investor_id == investor_id)
    }

    /// Records an investment, filling the plan.
    ///
    /// Creates or tops up the investor's stake; the plan transitions to
    /// Active exactly when the principal is fully funded. The caller
    /// debits the investor's wallet in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the plan is funding, and
    /// `ExceedsRemaining` if the amount overshoots the open principal.
    pub fn invest(mut self, investor_id: UserId, amount: Money) -> Result<Self, WorkflowError> {
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if self.status != GroupPlanStatus::Funding {
            return Err(WorkflowError::InvalidTransition {
                entity: "group plan",
                from: self.status.as_str(),
                to: GroupPlanStatus::Funding.as_str(),
            });
        }
        let remaining = self.remaining_funding();
        if amount > remaining {
            return Err(WorkflowError::ExceedsRemaining {
                requested: amount,
                remaining,
            });
        }

        match self
            .investments
            .iter_mut()
            .find(|i| i.investor_id == investor_id)
        {
            Some(investment) => investment.invested += amount,
            None => self.investments.push(Investment {
                investor_id,
                invested: amount,
                received: Money::ZERO,
            }),
        }
        self.amount_funded += amount;

        if self.amount_funded >= self.loan_amount {
            self.status = GroupPlanStatus::Active;
        }
        Ok(self)
    }

    /// Records borrower cash received against the plan.
    ///
    /// The repayment sits pending distribution until a payout consumes
    /// it. The plan completes exactly when `amount_repaid` reaches
    /// `total_repayment`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` unless the plan is active, and
    /// `ExceedsRemaining` if the amount overshoots what is owed.
    pub fn record_repayment(
        mut self,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if self.status != GroupPlanStatus::Active {
            return Err(WorkflowError::InvalidTransition {
                entity: "group plan",
                from: self.status.as_str(),
                to: GroupPlanStatus::Active.as_str(),
            });
        }
        let remaining = self.remaining_repayment();
        if amount > remaining {
            return Err(WorkflowError::ExceedsRemaining {
                requested: amount,
                remaining,
            });
        }

        self.repayments.push(Repayment {
            id: RepaymentId::new(),
            amount,
            status: RepaymentStatus::PendingDistribution,
            received_at: at,
        });
        self.amount_repaid += amount;

        if self.amount_repaid >= self.total_repayment {
            self.status = GroupPlanStatus::Completed;
        }
        Ok(self)
    }

    /// Distributes a payout to one investor.
    ///
    /// Consumes pending repayments oldest-first; a record partially
    /// used by the payout is still marked distributed whole, and the
    /// unused tail is reported as forfeited. The payout may not exceed
    /// the distributable pool, nor push the investor past their
    /// pro-rata entitlement. The caller credits the investor's wallet
    /// in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoInvestment`, `ExceedsRemaining` (against the pool),
    /// `ExceedsEntitlement`, or `InvalidTransition` on a still-funding
    /// plan.
    pub fn distribute(
        mut self,
        investor_id: UserId,
        amount: Money,
        at: DateTime<Utc>,
    ) -> Result<GroupDistribution, WorkflowError> {
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if self.status == GroupPlanStatus::Funding {
            return Err(WorkflowError::InvalidTransition {
                entity: "group plan",
                from: self.status.as_str(),
                to: GroupPlanStatus::Active.as_str(),
            });
        }
        let investment = self
            .investment_of(investor_id)
            .ok_or(WorkflowError::NoInvestment)?;

        let distributable = self.distributable();
        if amount > distributable {
            return Err(WorkflowError::ExceedsRemaining {
                requested: amount,
                remaining: distributable,
            });
        }

        let entitlement = allocation::pro_rata_entitlement(
            investment.invested,
            self.total_repayment,
            self.loan_amount,
        );
        let open_entitlement = entitlement - investment.received;
        if amount > open_entitlement {
            return Err(WorkflowError::ExceedsEntitlement {
                requested: amount,
                entitlement: open_entitlement,
            });
        }

        let pending: Vec<(RepaymentId, Money)> = self
            .repayments
            .iter()
            .filter(|r| r.status == RepaymentStatus::PendingDistribution)
            .map(|r| (r.id, r.amount))
            .collect();
        let distribution = allocation::consume_oldest_first(&pending, amount);

        for repayment in &mut self.repayments {
            if distribution.consumed.contains(&repayment.id) {
                repayment.status = RepaymentStatus::Distributed;
            }
        }
        if let Some(investment) = self
            .investments
            .iter_mut()
            .find(|i| i.investor_id == investor_id)
        {
            investment.received += amount;
        }

        let payout = Payout {
            id: PayoutId::new(),
            investor_id,
            amount,
            paid_at: at,
        };
        self.payouts.push(payout.clone());

        Ok(GroupDistribution {
            plan: self,
            payout,
            forfeited: distribution.forfeited,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> GroupLoanPlan {
        // 10000.00 principal + 1000.00 interest.
        GroupLoanPlan::new(
            Money::from_major(10_000),
            Money::from_major(1_000),
            RepaymentMethod::Direct,
            6,
            DurationUnit::Months,
            Utc::now(),
        )
        .unwrap()
    }

    fn funded_plan(a: UserId, b: UserId) -> GroupLoanPlan {
        plan()
            .invest(a, Money::from_major(6_000))
            .unwrap()
            .invest(b, Money::from_major(4_000))
            .unwrap()
    }

    #[test]
    fn test_new_plan_is_funding() {
        let plan = plan();
        assert_eq!(plan.status, GroupPlanStatus::Funding);
        assert_eq!(plan.total_repayment, Money::from_major(11_000));
        assert_eq!(plan.remaining_funding(), Money::from_major(10_000));
    }

    #[test]
    fn test_exact_fill_activates_once() {
        let a = UserId::new();
        let b = UserId::new();
        let plan = funded_plan(a, b);

        assert_eq!(plan.status, GroupPlanStatus::Active);
        assert_eq!(plan.amount_funded, Money::from_major(10_000));
        assert_eq!(plan.investments.len(), 2);

        // Funding is closed: another investment fails.
        let result = plan.invest(UserId::new(), Money::from_minor(1));
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { from: "active", .. })
        ));
    }

    #[test]
    fn test_overfunding_rejected() {
        let plan = plan().invest(UserId::new(), Money::from_major(9_000)).unwrap();
        let result = plan.invest(UserId::new(), Money::from_major(1_001));
        assert!(matches!(
            result,
            Err(WorkflowError::ExceedsRemaining { .. })
        ));
    }

    #[test]
    fn test_repeat_investor_tops_up_stake() {
        let a = UserId::new();
        let plan = plan()
            .invest(a, Money::from_major(2_000))
            .unwrap()
            .invest(a, Money::from_major(3_000))
            .unwrap();
        assert_eq!(plan.investments.len(), 1);
        assert_eq!(plan.investments[0].invested, Money::from_major(5_000));
        assert_eq!(
            plan.investments[0].invested,
            plan.amount_funded
        );
    }

    #[test]
    fn test_repayment_requires_active_plan() {
        let result = plan().record_repayment(Money::from_major(100), Utc::now());
        assert!(matches!(
            result,
            Err(WorkflowError::InvalidTransition { from: "funding", .. })
        ));
    }

    #[test]
    fn test_repayment_pools_and_completes() {
        let plan = funded_plan(UserId::new(), UserId::new());
        let plan = plan
            .record_repayment(Money::from_major(5_000), Utc::now())
            .unwrap();
        assert_eq!(plan.distributable(), Money::from_major(5_000));
        assert_eq!(plan.status, GroupPlanStatus::Active);

        let plan = plan
            .record_repayment(Money::from_major(6_000), Utc::now())
            .unwrap();
        assert_eq!(plan.status, GroupPlanStatus::Completed);
        assert_eq!(plan.amount_repaid, Money::from_major(11_000));
    }

    #[test]
    fn test_repayment_cannot_overshoot() {
        let plan = funded_plan(UserId::new(), UserId::new());
        let result = plan.record_repayment(Money::from_major(11_001), Utc::now());
        assert!(matches!(
            result,
            Err(WorkflowError::ExceedsRemaining { .. })
        ));
    }

    #[test]
    fn test_distribute_marks_repayment_and_credits() {
        let a = UserId::new();
        let plan = funded_plan(a, UserId::new());
        let plan = plan
            .record_repayment(Money::from_major(5_000), Utc::now())
            .unwrap();

        let outcome = plan.distribute(a, Money::from_major(5_000), Utc::now()).unwrap();
        let plan = outcome.plan;

        assert_eq!(outcome.payout.amount, Money::from_major(5_000));
        assert!(outcome.forfeited.is_zero());
        assert_eq!(plan.repayments[0].status, RepaymentStatus::Distributed);
        assert!(plan.distributable().is_zero());
        assert_eq!(plan.investment_of(a).unwrap().received, Money::from_major(5_000));
        assert_eq!(plan.payouts.len(), 1);
    }

    #[test]
    fn test_distribute_requires_stake() {
        let plan = funded_plan(UserId::new(), UserId::new());
        let plan = plan
            .record_repayment(Money::from_major(1_000), Utc::now())
            .unwrap();
        let result = plan.distribute(UserId::new(), Money::from_major(100), Utc::now());
        assert!(matches!(result, Err(WorkflowError::NoInvestment)));
    }

    #[test]
    fn test_distribute_cannot_overdraw_pool() {
        let a = UserId::new();
        let plan = funded_plan(a, UserId::new());
        let plan = plan
            .record_repayment(Money::from_major(1_000), Utc::now())
            .unwrap();
        let result = plan.distribute(a, Money::from_major(1_001), Utc::now());
        assert!(matches!(
            result,
            Err(WorkflowError::ExceedsRemaining { .. })
        ));
    }

    #[test]
    fn test_distribute_caps_at_entitlement() {
        let a = UserId::new();
        let b = UserId::new();
        let plan = funded_plan(a, b);
        // Full repayment arrives at once.
        let plan = plan
            .record_repayment(Money::from_major(11_000), Utc::now())
            .unwrap();

        // A funded 6000 of 10000: entitled to 6600 of the 11000 pot.
        let result = plan
            .clone()
            .distribute(a, Money::from_major(6_601), Utc::now());
        assert!(matches!(
            result,
            Err(WorkflowError::ExceedsEntitlement { .. })
        ));

        let outcome = plan.distribute(a, Money::from_major(6_600), Utc::now()).unwrap();
        assert_eq!(
            outcome.plan.investment_of(a).unwrap().received,
            Money::from_major(6_600)
        );
    }

    #[test]
    fn test_partial_consumption_forfeits_tail() {
        let a = UserId::new();
        let plan = funded_plan(a, UserId::new());
        let plan = plan
            .record_repayment(Money::from_major(5_000), Utc::now())
            .unwrap();

        // Paying out 3000 consumes the whole 5000 record.
        let outcome = plan.distribute(a, Money::from_major(3_000), Utc::now()).unwrap();
        assert_eq!(outcome.forfeited, Money::from_major(2_000));
        assert!(outcome.plan.distributable().is_zero());
    }

    #[test]
    fn test_distribute_allowed_after_completion() {
        let a = UserId::new();
        let plan = funded_plan(a, UserId::new());
        let plan = plan
            .record_repayment(Money::from_major(11_000), Utc::now())
            .unwrap();
        assert_eq!(plan.status, GroupPlanStatus::Completed);

        let outcome = plan.distribute(a, Money::from_major(1_000), Utc::now());
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_funded_sum_matches_investments() {
        let plan = funded_plan(UserId::new(), UserId::new());
        let invested: Money = plan.investments.iter().map(|i| i.invested).sum();
        assert_eq!(invested, plan.amount_funded);
    }
}

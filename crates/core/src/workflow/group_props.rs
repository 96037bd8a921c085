//! Property-based tests for the group loan state machine.

use chrono::Utc;
use proptest::prelude::*;

use mutuo_shared::types::{Money, UserId};

use crate::schedule::DurationUnit;
use crate::workflow::group::{GroupLoanPlan, GroupPlanStatus, RepaymentStatus};
use crate::workflow::loan::RepaymentMethod;

fn plan(principal_minor: i64, interest_minor: i64) -> GroupLoanPlan {
    GroupLoanPlan::new(
        Money::from_minor(principal_minor),
        Money::from_minor(interest_minor),
        RepaymentMethod::Direct,
        6,
        DurationUnit::Months,
        Utc::now(),
    )
    .expect("valid plan")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    /// Investments preserve `amount_funded == Σ invested`, never exceed
    /// the principal, and flip the plan Active exactly on fill.
    #[test]
    fn prop_funding_invariants(
        principal in 1_000i64..1_000_000,
        chunks in prop::collection::vec(1i64..200_000, 1..20)
    ) {
        let mut plan = plan(principal, principal / 10);
        for chunk in chunks {
            let remaining = plan.remaining_funding();
            if remaining.is_zero() {
                break;
            }
            let amount = Money::from_minor(chunk).min(remaining);
            plan = plan.invest(UserId::new(), amount).expect("within remaining");

            let invested: Money = plan.investments.iter().map(|i| i.invested).sum();
            prop_assert_eq!(invested, plan.amount_funded);
            prop_assert!(plan.amount_funded <= plan.loan_amount);
            let filled = plan.amount_funded == plan.loan_amount;
            prop_assert_eq!(plan.status == GroupPlanStatus::Active, filled);
        }
    }

    /// Repayments only ever increase `amount_repaid`, and distributed
    /// repayments always cover the payout total.
    #[test]
    fn prop_distribution_never_overdraws(
        repay_chunks in prop::collection::vec(1_000i64..50_000, 1..10),
        payout_percent in 1u8..=100
    ) {
        let principal = 100_000i64;
        let investor = UserId::new();
        let mut group = plan(principal, 10_000)
            .invest(investor, Money::from_minor(principal))
            .expect("fills plan");

        let mut repaid = Money::ZERO;
        for chunk in repay_chunks {
            let remaining = group.remaining_repayment();
            if remaining.is_zero() {
                break;
            }
            let amount = Money::from_minor(chunk).min(remaining);
            group = group.record_repayment(amount, Utc::now()).expect("within remaining");
            prop_assert!(group.amount_repaid > repaid);
            repaid = group.amount_repaid;
        }

        let distributable = group.distributable();
        let payout = Money::from_minor(
            distributable.minor() * i64::from(payout_percent) / 100,
        );
        if payout.is_positive() {
            let outcome = group
                .distribute(investor, payout, Utc::now())
                .expect("payout within pool and entitlement");
            let group = outcome.plan;

            let distributed: Money = group
                .repayments
                .iter()
                .filter(|r| r.status == RepaymentStatus::Distributed)
                .map(|r| r.amount)
                .sum();
            let paid_out: Money = group.payouts.iter().map(|p| p.amount).sum();
            // Distribution cannot overdraw undistributed funds.
            prop_assert!(distributed >= paid_out);
            prop_assert_eq!(
                outcome.forfeited,
                distributed - paid_out
            );
        }
    }
}

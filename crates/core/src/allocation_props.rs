//! Property-based tests for allocation utilities.

use proptest::prelude::*;

use mutuo_shared::types::{Money, RepaymentId};

use crate::allocation::{consume_oldest_first, pro_rata_entitlement, split_equal};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// The split hands out exactly the input total.
    #[test]
    fn prop_split_equal_sums_exactly(
        total in 0i64..1_000_000_000,
        count in 1usize..500
    ) {
        let parts = split_equal(Money::from_minor(total), count);
        prop_assert_eq!(parts.len(), count);
        prop_assert_eq!(parts.iter().sum::<Money>(), Money::from_minor(total));
    }

    /// No two parts differ by more than one minor unit.
    #[test]
    fn prop_split_equal_is_fair(
        total in 0i64..1_000_000,
        count in 1usize..100
    ) {
        let parts = split_equal(Money::from_minor(total), count);
        let min = parts.iter().min().map_or(0, |m| m.minor());
        let max = parts.iter().max().map_or(0, |m| m.minor());
        prop_assert!(max - min <= 1);
    }

    /// The consumed set is always the shortest covering prefix.
    #[test]
    fn prop_consume_is_minimal_prefix(
        amounts in prop::collection::vec(1i64..10_000, 1..20),
        percent in 1u8..=100
    ) {
        let pending: Vec<(RepaymentId, Money)> = amounts
            .iter()
            .map(|&a| (RepaymentId::new(), Money::from_minor(a)))
            .collect();
        let total: i64 = amounts.iter().sum();
        let payout = Money::from_minor(total * i64::from(percent) / 100);

        let plan = consume_oldest_first(&pending, payout);

        // Covers the payout (the distributable total always suffices here).
        prop_assert!(plan.covered >= payout);
        // Consumed ids are a prefix of the pending list.
        let prefix: Vec<RepaymentId> = pending
            .iter()
            .take(plan.consumed.len())
            .map(|(id, _)| *id)
            .collect();
        prop_assert_eq!(&plan.consumed, &prefix);
        // Minimality: one record fewer would not cover.
        if !plan.consumed.is_empty() {
            let without_last: Money = pending
                .iter()
                .take(plan.consumed.len() - 1)
                .map(|(_, m)| *m)
                .sum();
            prop_assert!(without_last < payout);
        }
        // The forfeited tail is exactly the overshoot.
        prop_assert_eq!(plan.forfeited, plan.covered - payout.min(plan.covered));
    }

    /// An investor can never be entitled to more than the whole pot, and
    /// a full funder is entitled to exactly the total repayment.
    #[test]
    fn prop_entitlement_bounded(
        invested in 1i64..1_000_000,
        principal in 1i64..1_000_000,
        interest in 0i64..100_000
    ) {
        let invested = Money::from_minor(invested.min(principal));
        let principal = Money::from_minor(principal);
        let total = principal + Money::from_minor(interest);

        let share = pro_rata_entitlement(invested, total, principal);
        prop_assert!(share <= total);
        prop_assert!(share >= invested.min(total) - Money::from_minor(1));

        let full = pro_rata_entitlement(principal, total, principal);
        prop_assert_eq!(full, total);
    }
}

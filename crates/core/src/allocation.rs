//! Exact-sum allocation utilities.
//!
//! Splits and distributions here must never lose or invent a minor
//! unit: the sum of whatever is handed out always equals what was put
//! in. Equal splits use the Largest Remainder Method: round everything
//! down, then give the leftover units to the first recipients.

use mutuo_shared::types::{Money, RepaymentId};

/// Splits `total` into `count` amounts whose sum is exactly `total`.
///
/// The first `total mod count` recipients receive one extra minor unit,
/// so no amount differs from another by more than one unit.
#[must_use]
pub fn split_equal(total: Money, count: usize) -> Vec<Money> {
    if count == 0 {
        return Vec::new();
    }
    let n = i64::try_from(count).unwrap_or(i64::MAX);
    let base = total.minor().div_euclid(n);
    let extra = total.minor().rem_euclid(n);

    (0..n)
        .map(|i| {
            if i < extra {
                Money::from_minor(base + 1)
            } else {
                Money::from_minor(base)
            }
        })
        .collect()
}

/// Result of allocating a payout against pending repayments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributionPlan {
    /// Repayments to mark distributed, oldest first.
    pub consumed: Vec<RepaymentId>,
    /// Total amount of the consumed repayments.
    pub covered: Money,
    /// Amount of the last consumed repayment not used by the payout.
    ///
    /// The whole record is still marked distributed; the remainder is
    /// not tracked further, only reported.
    pub forfeited: Money,
}

/// Consumes pending repayments oldest-first until they cover `payout`.
///
/// `pending` must be ordered oldest first. A repayment is consumed
/// whole: if the payout ends partway through a record, that record is
/// still fully consumed and the unused tail is reported as forfeited.
/// If the pending total cannot cover the payout, everything is consumed
/// and `covered` stays below `payout`; callers validate the payout
/// against the distributable total before committing anything.
#[must_use]
pub fn consume_oldest_first(pending: &[(RepaymentId, Money)], payout: Money) -> DistributionPlan {
    let mut consumed = Vec::new();
    let mut covered = Money::ZERO;

    for (id, amount) in pending {
        if covered >= payout {
            break;
        }
        consumed.push(*id);
        covered += *amount;
    }

    let forfeited = if covered > payout {
        covered - payout
    } else {
        Money::ZERO
    };

    DistributionPlan {
        consumed,
        covered,
        forfeited,
    }
}

/// An investor's pro-rata entitlement from a group loan.
///
/// `invested * total_repayment / loan_amount`, floored to minor units:
/// principal back plus the proportional share of interest.
#[must_use]
pub fn pro_rata_entitlement(invested: Money, total_repayment: Money, loan_amount: Money) -> Money {
    if !loan_amount.is_positive() {
        return Money::ZERO;
    }
    let numerator = i128::from(invested.minor()) * i128::from(total_repayment.minor());
    let share = numerator.div_euclid(i128::from(loan_amount.minor()));
    Money::from_minor(i64::try_from(share).unwrap_or(i64::MAX))
}

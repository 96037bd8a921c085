//! Ledger domain types: accounts and entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use mutuo_shared::types::{LedgerEntryId, LoanId, LoanRequestId, Money, UserId};

/// Classifies what a ledger entry paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Admin-approved deposit credited to the wallet.
    Deposit,
    /// Withdrawal escrow debit taken at request time.
    Withdrawal,
    /// Refund of a rejected withdrawal's escrow.
    WithdrawalReversal,
    /// Investment into a standalone plan.
    Investment,
    /// Loan principal paid out to a borrower.
    LoanDisbursement,
    /// Borrower repayment against an active loan.
    LoanRepayment,
    /// Investor funding of a group loan plan.
    GroupInvestment,
    /// Investor share of a group loan repayment.
    GroupPayout,
    /// One-time bonus credited to a referrer.
    ReferralBonus,
    /// Coupon amount credited on redemption.
    CouponRedemption,
}

impl EntryKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdrawal => "withdrawal",
            Self::WithdrawalReversal => "withdrawal_reversal",
            Self::Investment => "investment",
            Self::LoanDisbursement => "loan_disbursement",
            Self::LoanRepayment => "loan_repayment",
            Self::GroupInvestment => "group_investment",
            Self::GroupPayout => "group_payout",
            Self::ReferralBonus => "referral_bonus",
            Self::CouponRedemption => "coupon_redemption",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable, append-only record of one balance mutation.
///
/// Credits carry positive amounts, debits negative ones; the signed sum
/// of an account's entries is its wallet balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique identifier.
    pub id: LedgerEntryId,
    /// The account whose balance moved.
    pub account_id: UserId,
    /// Signed amount in minor units.
    pub amount: Money,
    /// What the movement paid for.
    pub kind: EntryKind,
    /// The domain entity that caused the movement.
    pub related_id: Uuid,
    /// When the entry was recorded.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Builds a credit entry (positive amount).
    #[must_use]
    pub fn credit(
        account_id: UserId,
        amount: Money,
        kind: EntryKind,
        related_id: Uuid,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            account_id,
            amount,
            kind,
            related_id,
            created_at: at,
        }
    }

    /// Builds a debit entry (negative amount).
    #[must_use]
    pub fn debit(
        account_id: UserId,
        amount: Money,
        kind: EntryKind,
        related_id: Uuid,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            account_id,
            amount: -amount,
            kind,
            related_id,
            created_at: at,
        }
    }
}

/// Account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    /// Account can move funds.
    Active,
    /// Account is frozen by an admin; no funds move.
    Blocked,
}

/// A user's wallet account.
///
/// The balance is a cached projection of the ledger; it is only ever
/// mutated through [`super::LedgerService`] inside a store transaction
/// that also appends the matching entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// The owning user.
    pub user_id: UserId,
    /// Cached wallet balance, never negative.
    pub wallet_balance: Money,
    /// Lifetime sum of investments made by this user.
    pub total_investment: Money,
    /// Lifetime sum of payouts and bonuses received.
    pub total_income: Money,
    /// Account status.
    pub status: AccountStatus,
    /// Who referred this user, if anyone.
    pub referred_by: Option<UserId>,
    /// One-time marker: the referrer's bonus for this user was paid.
    pub referral_bonus_paid: bool,
    /// The user's open loan request, at most one at a time.
    pub open_loan_request: Option<LoanRequestId>,
    /// The user's running loan, at most one at a time.
    pub open_loan: Option<LoanId>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a fresh, empty account.
    #[must_use]
    pub fn new(user_id: UserId, referred_by: Option<UserId>, at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            wallet_balance: Money::ZERO,
            total_investment: Money::ZERO,
            total_income: Money::ZERO,
            status: AccountStatus::Active,
            referred_by,
            referral_bonus_paid: false,
            open_loan_request: None,
            open_loan: None,
            created_at: at,
        }
    }

    /// Returns true if the account may move funds.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Returns true if the user may submit a new loan request.
    ///
    /// Exactly one non-terminal loan request or running loan is allowed
    /// per user.
    #[must_use]
    pub fn is_loan_eligible(&self) -> bool {
        self.open_loan_request.is_none() && self.open_loan.is_none()
    }
}

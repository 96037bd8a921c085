//! Command surface for the Mutuo ledger and workflow engine.
//!
//! The [`Engine`] owns the document store and exposes one method per
//! money-moving operation. Each command runs as a single optimistic
//! transaction: read the documents it touches, apply the pure
//! transitions from `mutuo-core`, buffer the writes plus the matching
//! ledger entries, and commit all-or-nothing with bounded retry on
//! conflict.
//!
//! # Modules
//!
//! - `accounts` - Account creation, status, ledger queries
//! - `deposits` - Deposit request commands
//! - `withdrawals` - Withdrawal request commands (escrow + refund)
//! - `loans` - Loan plan/request/active-loan commands
//! - `group_loans` - Group loan funding, repayment, payout commands
//! - `coupons` - Coupon commands

pub mod accounts;
pub mod coupons;
pub mod deposits;
pub mod error;
pub mod group_loans;
pub mod loans;
pub mod withdrawals;

pub use error::{EngineError, EngineResult};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use mutuo_core::ledger::{Account, EntryKind, LedgerEntry, LedgerService};
use mutuo_core::workflow::{
    ActiveLoan, Coupon, DepositRequest, GroupLoanPlan, LoanPlan, LoanRequest, WithdrawalRequest,
};
use mutuo_shared::EngineConfig;
use mutuo_shared::types::{
    DepositId, GroupPlanId, LedgerEntryId, LoanId, LoanPlanId, LoanRequestId, Money, UserId,
    WithdrawalId,
};
use mutuo_store::{Collection, Store, Txn};

/// The collections backing the engine, one per entity.
pub(crate) struct Datastore {
    pub store: Store,
    pub accounts: Collection<UserId, Account>,
    pub ledger: Collection<LedgerEntryId, LedgerEntry>,
    pub deposits: Collection<DepositId, DepositRequest>,
    pub withdrawals: Collection<WithdrawalId, WithdrawalRequest>,
    pub loan_plans: Collection<LoanPlanId, LoanPlan>,
    pub loan_requests: Collection<LoanRequestId, LoanRequest>,
    pub loans: Collection<LoanId, ActiveLoan>,
    pub group_plans: Collection<GroupPlanId, GroupLoanPlan>,
    pub coupons: Collection<String, Coupon>,
}

/// The ledger and workflow engine.
///
/// Cheap to share behind an `Arc`; all commands take `&self` and
/// serialize through the store's commit validation, never through
/// long-held locks.
pub struct Engine {
    config: EngineConfig,
    data: Datastore,
}

impl Engine {
    /// Creates an engine with empty collections.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let data = Datastore {
            store: Store::new(config.store.max_retries),
            accounts: Collection::new("accounts"),
            ledger: Collection::new("ledger_entries"),
            deposits: Collection::new("deposits"),
            withdrawals: Collection::new("withdrawals"),
            loan_plans: Collection::new("loan_plans"),
            loan_requests: Collection::new("loan_requests"),
            loans: Collection::new("loans"),
            group_plans: Collection::new("group_plans"),
            coupons: Collection::new("coupons"),
        };
        Self { config, data }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Credits an account inside a transaction: balance update plus one
    /// ledger entry, buffered together. Returns the updated account,
    /// which is already `put`; callers that mutate it further must
    /// `put` it again.
    pub(crate) fn post_credit<'s>(
        &'s self,
        txn: &mut Txn<'s>,
        account: &Account,
        amount: Money,
        kind: EntryKind,
        related_id: Uuid,
        at: DateTime<Utc>,
    ) -> EngineResult<Account> {
        let updated = LedgerService::credit(account, amount)?;
        txn.put(&self.data.accounts, updated.user_id, updated.clone());
        let entry = LedgerEntry::credit(updated.user_id, amount, kind, related_id, at);
        txn.insert(&self.data.ledger, entry.id, entry)?;
        Ok(updated)
    }

    /// Debits an account inside a transaction; see [`Self::post_credit`].
    pub(crate) fn post_debit<'s>(
        &'s self,
        txn: &mut Txn<'s>,
        account: &Account,
        amount: Money,
        kind: EntryKind,
        related_id: Uuid,
        at: DateTime<Utc>,
    ) -> EngineResult<Account> {
        let updated = LedgerService::debit(account, amount)?;
        txn.put(&self.data.accounts, updated.user_id, updated.clone());
        let entry = LedgerEntry::debit(updated.user_id, amount, kind, related_id, at);
        txn.insert(&self.data.ledger, entry.id, entry)?;
        Ok(updated)
    }
}

//! Credit and debit rules.
//!
//! Pure functions: they take the current account value and return the
//! updated one, or an error with nothing changed. The engine is
//! responsible for persisting the returned account together with the
//! matching ledger entry in one transaction.

use mutuo_shared::types::Money;

use super::error::LedgerError;
use super::types::{Account, LedgerEntry};

/// Stateless credit/debit rule service.
pub struct LedgerService;

impl LedgerService {
    /// Validates an amount for a balance mutation.
    fn validate_amount(amount: Money) -> Result<(), LedgerError> {
        if amount.is_zero() {
            return Err(LedgerError::ZeroAmount);
        }
        if amount.is_negative() {
            return Err(LedgerError::NegativeAmount);
        }
        Ok(())
    }

    /// Credits an account, returning the updated value.
    ///
    /// # Errors
    ///
    /// Returns `ZeroAmount`/`NegativeAmount` for invalid amounts and
    /// `AccountBlocked` for frozen accounts.
    pub fn credit(account: &Account, amount: Money) -> Result<Account, LedgerError> {
        Self::validate_amount(amount)?;
        if !account.is_active() {
            return Err(LedgerError::AccountBlocked(account.user_id));
        }

        let balance = account
            .wallet_balance
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(account.user_id))?;

        let mut updated = account.clone();
        updated.wallet_balance = balance;
        Ok(updated)
    }

    /// Debits an account, returning the updated value.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` when the amount exceeds the wallet
    /// balance, with no mutation.
    pub fn debit(account: &Account, amount: Money) -> Result<Account, LedgerError> {
        Self::validate_amount(amount)?;
        if !account.is_active() {
            return Err(LedgerError::AccountBlocked(account.user_id));
        }
        if amount > account.wallet_balance {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: account.wallet_balance,
            });
        }

        let mut updated = account.clone();
        updated.wallet_balance = account.wallet_balance - amount;
        Ok(updated)
    }

    /// Signed sum of a slice of ledger entries.
    ///
    /// For a complete slice of one account's entries this equals the
    /// cached wallet balance.
    #[must_use]
    pub fn balance_from_entries(entries: &[LedgerEntry]) -> Money {
        entries.iter().map(|e| e.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::types::{AccountStatus, EntryKind};
    use chrono::Utc;
    use mutuo_shared::types::UserId;
    use uuid::Uuid;

    fn account_with(balance: i64) -> Account {
        let mut account = Account::new(UserId::new(), None, Utc::now());
        account.wallet_balance = Money::from_minor(balance);
        account
    }

    #[test]
    fn test_credit_increases_balance() {
        let account = account_with(100);
        let updated = LedgerService::credit(&account, Money::from_minor(50)).unwrap();
        assert_eq!(updated.wallet_balance, Money::from_minor(150));
        // The input is untouched.
        assert_eq!(account.wallet_balance, Money::from_minor(100));
    }

    #[test]
    fn test_debit_decreases_balance() {
        let account = account_with(100);
        let updated = LedgerService::debit(&account, Money::from_minor(60)).unwrap();
        assert_eq!(updated.wallet_balance, Money::from_minor(40));
    }

    #[test]
    fn test_debit_insufficient_funds() {
        let account = account_with(100);
        let result = LedgerService::debit(&account, Money::from_minor(101));
        assert!(matches!(
            result,
            Err(LedgerError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_debit_entire_balance() {
        let account = account_with(100);
        let updated = LedgerService::debit(&account, Money::from_minor(100)).unwrap();
        assert!(updated.wallet_balance.is_zero());
    }

    #[test]
    fn test_zero_and_negative_amounts_rejected() {
        let account = account_with(100);
        assert!(matches!(
            LedgerService::credit(&account, Money::ZERO),
            Err(LedgerError::ZeroAmount)
        ));
        assert!(matches!(
            LedgerService::debit(&account, Money::from_minor(-5)),
            Err(LedgerError::NegativeAmount)
        ));
    }

    #[test]
    fn test_blocked_account_rejected() {
        let mut account = account_with(100);
        account.status = AccountStatus::Blocked;
        assert!(matches!(
            LedgerService::credit(&account, Money::from_minor(10)),
            Err(LedgerError::AccountBlocked(_))
        ));
        assert!(matches!(
            LedgerService::debit(&account, Money::from_minor(10)),
            Err(LedgerError::AccountBlocked(_))
        ));
    }

    #[test]
    fn test_balance_from_entries() {
        let user = UserId::new();
        let now = Utc::now();
        let entries = vec![
            LedgerEntry::credit(user, Money::from_minor(1000), EntryKind::Deposit, Uuid::now_v7(), now),
            LedgerEntry::debit(user, Money::from_minor(300), EntryKind::Withdrawal, Uuid::now_v7(), now),
            LedgerEntry::credit(user, Money::from_minor(50), EntryKind::ReferralBonus, Uuid::now_v7(), now),
        ];
        assert_eq!(
            LedgerService::balance_from_entries(&entries),
            Money::from_minor(750)
        );
    }
}

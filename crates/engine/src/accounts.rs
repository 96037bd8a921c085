//! Account commands and ledger queries.

use chrono::Utc;
use tracing::info;

use mutuo_core::ledger::{Account, AccountStatus, LedgerEntry, LedgerService};
use mutuo_shared::types::{Money, UserId};
use mutuo_store::StoreError;

use crate::{Engine, EngineResult};

impl Engine {
    /// Creates a wallet account for a user.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` if the user already has an account.
    pub fn create_account(
        &self,
        user_id: UserId,
        referred_by: Option<UserId>,
    ) -> EngineResult<Account> {
        let now = Utc::now();
        let account = self.data.store.run(|txn| {
            let account = Account::new(user_id, referred_by, now);
            txn.insert(&self.data.accounts, user_id, account.clone())?;
            Ok::<_, crate::EngineError>(account)
        })?;
        info!(user_id = %user_id, "account created");
        Ok(account)
    }

    /// Blocks or unblocks an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account.
    pub fn set_account_status(
        &self,
        user_id: UserId,
        status: AccountStatus,
    ) -> EngineResult<Account> {
        let account = self.data.store.run(|txn| {
            let mut account = txn.get_required(&self.data.accounts, &user_id)?;
            account.status = status;
            txn.put(&self.data.accounts, user_id, account.clone());
            Ok::<_, crate::EngineError>(account)
        })?;
        info!(user_id = %user_id, status = ?status, "account status changed");
        Ok(account)
    }

    /// Reads an account.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown account.
    pub fn account(&self, user_id: UserId) -> EngineResult<Account> {
        self.data
            .accounts
            .snapshot(&user_id)
            .ok_or_else(|| {
                StoreError::NotFound {
                    collection: self.data.accounts.name(),
                    key: user_id.to_string(),
                }
                .into()
            })
    }

    /// All ledger entries for an account, oldest first.
    #[must_use]
    pub fn ledger_entries(&self, user_id: UserId) -> Vec<LedgerEntry> {
        let mut entries: Vec<LedgerEntry> = self
            .data
            .ledger
            .scan()
            .into_iter()
            .filter(|e| e.account_id == user_id)
            .collect();
        entries.sort_by_key(|e| e.id.into_inner());
        entries
    }

    /// The account balance derived from the ledger alone.
    ///
    /// Equals the cached `wallet_balance` whenever the store is
    /// quiescent; the invariant tests lean on this.
    #[must_use]
    pub fn ledger_balance(&self, user_id: UserId) -> Money {
        LedgerService::balance_from_entries(&self.ledger_entries(user_id))
    }
}

//! Coupon commands.

use chrono::Utc;
use tracing::info;

use mutuo_core::ledger::EntryKind;
use mutuo_core::workflow::Coupon;
use mutuo_shared::types::{Money, UserId};
use mutuo_store::StoreError;

use crate::{Engine, EngineError, EngineResult};

impl Engine {
    /// Reads a coupon by code.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown code.
    pub fn coupon(&self, code: &str) -> EngineResult<Coupon> {
        let key = code.to_string();
        self.data.coupons.snapshot(&key).ok_or_else(|| {
            StoreError::NotFound {
                collection: self.data.coupons.name(),
                key,
            }
            .into()
        })
    }

    /// Creates a coupon under its unique code.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateKey` for a reused code, or the coupon
    /// validation failures.
    pub fn create_coupon(
        &self,
        code: String,
        amount: Money,
        max_stock: u32,
    ) -> EngineResult<Coupon> {
        let coupon = Coupon::new(code, amount, max_stock, Utc::now())?;
        self.data.store.run(|txn| {
            txn.insert(&self.data.coupons, coupon.code.clone(), coupon.clone())?;
            Ok::<_, EngineError>(())
        })?;
        info!(code = %coupon.code, amount = %coupon.amount, stock = coupon.max_stock, "coupon created");
        Ok(coupon)
    }

    /// Redeems a coupon for a user: redemption record, wallet credit,
    /// and the depletion flip, atomically.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyRedeemed` for a repeat user or `Depleted` once
    /// the stock is consumed.
    pub fn redeem_coupon(&self, code: &str, user_id: UserId) -> EngineResult<Coupon> {
        let now = Utc::now();
        let key = code.to_string();
        let coupon = self.data.store.run(|txn| {
            let coupon = txn.get_required(&self.data.coupons, &key)?;
            let account = txn.get_required(&self.data.accounts, &user_id)?;
            let coupon = coupon.redeem(user_id, now)?;
            let mut account = self.post_credit(
                txn,
                &account,
                coupon.amount,
                EntryKind::CouponRedemption,
                coupon.id.into_inner(),
                now,
            )?;
            account.total_income += coupon.amount;
            txn.put(&self.data.accounts, user_id, account);
            txn.put(&self.data.coupons, key.clone(), coupon.clone());
            Ok::<_, EngineError>(coupon)
        })?;
        info!(
            code = %coupon.code,
            user_id = %user_id,
            remaining_stock = coupon.remaining_stock(),
            "coupon redeemed"
        );
        Ok(coupon)
    }
}

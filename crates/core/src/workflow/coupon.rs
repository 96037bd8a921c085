//! Coupon redemption state machine.
//!
//! A coupon carries a fixed credit and a stock of redemptions. Each
//! user redeems at most once; the redemption that consumes the last
//! unit of stock flips the coupon to depleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mutuo_shared::types::{CouponId, Money, UserId};

use super::error::WorkflowError;

/// Coupon status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponStatus {
    /// Redeemable.
    Active,
    /// Stock consumed; terminal.
    Depleted,
}

/// One user's redemption of a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    /// The redeeming user.
    pub user_id: UserId,
    /// When the coupon was redeemed.
    pub redeemed_at: DateTime<Utc>,
}

/// A wallet-credit coupon, keyed by its unique code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique identifier, referenced by ledger entries.
    pub id: CouponId,
    /// Unique, user-facing code.
    pub code: String,
    /// Credit per redemption.
    pub amount: Money,
    /// Total redemptions allowed.
    pub max_stock: u32,
    /// Coupon status.
    pub status: CouponStatus,
    /// Who redeemed, in order.
    pub redemptions: Vec<Redemption>,
    /// When the coupon was created.
    pub created_at: DateTime<Utc>,
}

impl Coupon {
    /// Creates an active coupon.
    ///
    /// # Errors
    ///
    /// Returns `CodeRequired` for a blank code, `InvalidAmount` for a
    /// non-positive credit, and `InvalidStock` for zero stock.
    pub fn new(
        code: String,
        amount: Money,
        max_stock: u32,
        at: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        if code.trim().is_empty() {
            return Err(WorkflowError::CodeRequired);
        }
        if !amount.is_positive() {
            return Err(WorkflowError::InvalidAmount);
        }
        if max_stock == 0 {
            return Err(WorkflowError::InvalidStock);
        }
        Ok(Self {
            id: CouponId::new(),
            code,
            amount,
            max_stock,
            status: CouponStatus::Active,
            redemptions: Vec::new(),
            created_at: at,
        })
    }

    /// Redemptions still available.
    #[must_use]
    pub fn remaining_stock(&self) -> u32 {
        let used = u32::try_from(self.redemptions.len()).unwrap_or(u32::MAX);
        self.max_stock.saturating_sub(used)
    }

    /// Redeems the coupon for a user.
    ///
    /// The caller credits the user's wallet by `amount` in the same
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `Depleted` when no stock remains and `AlreadyRedeemed`
    /// for a repeat user.
    pub fn redeem(mut self, user_id: UserId, at: DateTime<Utc>) -> Result<Self, WorkflowError> {
        if self.status != CouponStatus::Active {
            return Err(WorkflowError::Depleted);
        }
        if self.redemptions.iter().any(|r| r.user_id == user_id) {
            return Err(WorkflowError::AlreadyRedeemed);
        }
        if self.remaining_stock() == 0 {
            return Err(WorkflowError::Depleted);
        }

        self.redemptions.push(Redemption {
            user_id,
            redeemed_at: at,
        });
        if self.remaining_stock() == 0 {
            self.status = CouponStatus::Depleted;
        }
        Ok(self)
    }
}

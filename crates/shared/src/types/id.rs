//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `UserId` where a
//! `LoanRequestId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user (and their wallet account).");
typed_id!(LedgerEntryId, "Unique identifier for a ledger entry.");
typed_id!(DepositId, "Unique identifier for a deposit request.");
typed_id!(WithdrawalId, "Unique identifier for a withdrawal request.");
typed_id!(LoanPlanId, "Unique identifier for a loan plan.");
typed_id!(LoanRequestId, "Unique identifier for a loan request.");
typed_id!(LoanId, "Unique identifier for an active loan.");
typed_id!(GroupPlanId, "Unique identifier for a group loan plan.");
typed_id!(CouponId, "Unique identifier for a coupon.");
typed_id!(RepaymentId, "Unique identifier for a group loan repayment.");
typed_id!(PayoutId, "Unique identifier for a group loan payout.");

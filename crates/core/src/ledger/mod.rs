//! Wallet accounts and the append-only ledger.
//!
//! This module implements the core ledger functionality:
//! - Ledger entries (signed amounts, one per balance mutation)
//! - Wallet account projections with cached balances
//! - Credit/debit rules and their error types
//!
//! The ledger is the source of truth: for every account, the wallet
//! balance must equal the signed sum of its entries at all times.

pub mod error;
pub mod service;
pub mod types;

pub use error::LedgerError;
pub use service::LedgerService;
pub use types::{Account, AccountStatus, EntryKind, LedgerEntry};

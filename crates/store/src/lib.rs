//! In-process versioned document store with optimistic transactions.
//!
//! Collections map keys to versioned documents. A transaction snapshots
//! the documents it reads, buffers its writes, and at commit re-validates
//! every read version under the store-wide commit lock before applying
//! all writes at once. A failed validation aborts the whole transaction
//! (nothing is applied) and the operation is retried a bounded number of
//! times.
//!
//! This gives the classic document-database guarantees: transactions
//! touching the same document serialize, transactions on disjoint
//! documents proceed concurrently, and multi-document steps are atomic.

pub mod collection;
pub mod error;
pub mod txn;

pub use collection::{Collection, Versioned};
pub use error::StoreError;
pub use txn::{Store, Txn};

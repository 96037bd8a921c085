//! Optimistic transactions: read-validate-write with bounded retry.

use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use crate::collection::Collection;
use crate::error::StoreError;

/// A single optimistic transaction.
///
/// `get` snapshots documents and records their versions in the read set;
/// `put`/`insert` buffer writes. Nothing touches the collections until
/// [`Store::run`] commits: it re-validates every recorded version under
/// the commit lock and then applies all buffered writes, or none.
///
/// Reads observe committed state only; a transaction does not see its
/// own buffered writes.
#[derive(Default)]
pub struct Txn<'s> {
    checks: Vec<Box<dyn Fn() -> bool + 's>>,
    writes: Vec<Box<dyn FnOnce() + 's>>,
}

impl<'s> Txn<'s> {
    fn new() -> Self {
        Self {
            checks: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Reads a document, recording its version (or absence) in the read
    /// set.
    pub fn get<K, V>(&mut self, col: &'s Collection<K, V>, key: &K) -> Option<V>
    where
        K: Eq + Hash + Clone + 's,
        V: Clone + 's,
    {
        let observed = col.read(key);
        let key = key.clone();
        match observed {
            Some((version, doc)) => {
                self.checks
                    .push(Box::new(move || col.version_of(&key) == Some(version)));
                Some(doc)
            }
            None => {
                self.checks
                    .push(Box::new(move || col.version_of(&key).is_none()));
                None
            }
        }
    }

    /// Reads a document that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the key is absent.
    pub fn get_required<K, V>(
        &mut self,
        col: &'s Collection<K, V>,
        key: &K,
    ) -> Result<V, StoreError>
    where
        K: Eq + Hash + Clone + Display + 's,
        V: Clone + 's,
    {
        self.get(col, key).ok_or_else(|| StoreError::NotFound {
            collection: col.name(),
            key: key.to_string(),
        })
    }

    /// Buffers an update (or upsert) of a document.
    pub fn put<K, V>(&mut self, col: &'s Collection<K, V>, key: K, doc: V)
    where
        K: Eq + Hash + Clone + 's,
        V: Clone + 's,
    {
        self.writes.push(Box::new(move || col.apply_put(key, doc)));
    }

    /// Buffers the insert of a new document.
    ///
    /// The key must be absent both now and at commit time; a concurrent
    /// insert of the same key aborts the transaction as a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the key already exists.
    pub fn insert<K, V>(
        &mut self,
        col: &'s Collection<K, V>,
        key: K,
        doc: V,
    ) -> Result<(), StoreError>
    where
        K: Eq + Hash + Clone + Display + 's,
        V: Clone + 's,
    {
        if col.contains(&key) {
            return Err(StoreError::DuplicateKey {
                collection: col.name(),
                key: key.to_string(),
            });
        }
        let guard_key = key.clone();
        self.checks
            .push(Box::new(move || col.version_of(&guard_key).is_none()));
        self.writes.push(Box::new(move || col.apply_put(key, doc)));
        Ok(())
    }
}

/// Commit coordinator for optimistic transactions.
///
/// Holds only the commit lock and the retry budget; collections are
/// owned by the caller and borrowed into each transaction.
#[derive(Debug)]
pub struct Store {
    commit_lock: Mutex<()>,
    max_retries: u32,
}

impl Store {
    /// Creates a store with the given retry budget.
    #[must_use]
    pub fn new(max_retries: u32) -> Self {
        Self {
            commit_lock: Mutex::new(()),
            max_retries,
        }
    }

    /// Runs an operation as an optimistic transaction.
    ///
    /// The closure is re-invoked from scratch on every conflicting
    /// attempt, so it must be side-effect free apart from the `Txn`
    /// buffers. A business error returned by the closure aborts the
    /// transaction immediately with nothing applied.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or [`StoreError::RetriesExhausted`]
    /// once the retry budget is spent.
    pub fn run<'s, T, E>(&self, mut op: impl FnMut(&mut Txn<'s>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StoreError>,
    {
        let mut attempt: u32 = 0;
        loop {
            let mut txn = Txn::new();
            let out = op(&mut txn)?;
            match self.commit(txn) {
                Ok(()) => return Ok(out),
                Err(StoreError::Conflict) if attempt < self.max_retries => {
                    attempt += 1;
                }
                Err(StoreError::Conflict) => {
                    return Err(StoreError::RetriesExhausted {
                        attempts: attempt + 1,
                    }
                    .into());
                }
                Err(other) => return Err(other.into()),
            }
        }
    }

    /// Validates the read set and applies the write buffer atomically.
    fn commit(&self, txn: Txn<'_>) -> Result<(), StoreError> {
        let _guard = self
            .commit_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if !txn.checks.iter().all(|check| check()) {
            return Err(StoreError::Conflict);
        }
        for write in txn.writes {
            write();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn store() -> Store {
        Store::new(5)
    }

    #[test]
    fn test_commit_applies_buffered_writes() {
        let store = store();
        let col: Collection<&str, i64> = Collection::new("numbers");

        let result: Result<(), StoreError> = store.run(|txn| {
            txn.put(&col, "a", 1);
            txn.put(&col, "b", 2);
            Ok(())
        });

        assert!(result.is_ok());
        assert_eq!(col.snapshot(&"a"), Some(1));
        assert_eq!(col.snapshot(&"b"), Some(2));
    }

    #[test]
    fn test_business_error_applies_nothing() {
        let store = store();
        let col: Collection<&str, i64> = Collection::new("numbers");

        let result: Result<(), StoreError> = store.run(|txn| {
            txn.put(&col, "a", 1);
            Err(StoreError::NotFound {
                collection: "numbers",
                key: "missing".to_string(),
            })
        });

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
        assert!(col.is_empty());
    }

    #[test]
    fn test_insert_duplicate_rejected() {
        let store = store();
        let col: Collection<String, i64> = Collection::new("numbers");
        col.apply_put("a".to_string(), 1);

        let result: Result<(), StoreError> =
            store.run(|txn| txn.insert(&col, "a".to_string(), 2).map_err(Into::into));

        assert!(matches!(result, Err(StoreError::DuplicateKey { .. })));
        assert_eq!(col.snapshot(&"a".to_string()), Some(1));
    }

    #[test]
    fn test_get_required_missing() {
        let store = store();
        let col: Collection<String, i64> = Collection::new("numbers");

        let result: Result<i64, StoreError> =
            store.run(|txn| txn.get_required(&col, &"nope".to_string()));

        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[test]
    fn test_conflicting_writers_serialize() {
        // 8 threads x 50 read-modify-write increments on one document.
        // Version validation must force every lost update to retry.
        let store = Arc::new(Store::new(1_000));
        let col: Arc<Collection<&'static str, i64>> = Arc::new(Collection::new("counter"));
        col.apply_put("n", 0);

        let threads: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let col = Arc::clone(&col);
                thread::spawn(move || {
                    for _ in 0..50 {
                        let result: Result<(), StoreError> = store.run(|txn| {
                            let current = txn.get(&col, &"n").unwrap_or(0);
                            txn.put(&col, "n", current + 1);
                            Ok(())
                        });
                        result.unwrap();
                    }
                })
            })
            .collect();

        for t in threads {
            t.join().unwrap();
        }
        assert_eq!(col.snapshot(&"n"), Some(400));
    }

    #[test]
    fn test_retries_exhausted_surfaces() {
        let store = Store::new(2);
        let col: Collection<&str, i64> = Collection::new("numbers");
        col.apply_put("n", 0);

        // Sabotage: bump the document under every attempt so commit-time
        // validation always fails.
        let result: Result<(), StoreError> = store.run(|txn| {
            let current = txn.get(&col, &"n").unwrap_or(0);
            col.apply_put("n", current + 100);
            txn.put(&col, "n", current + 1);
            Ok(())
        });

        assert!(matches!(
            result,
            Err(StoreError::RetriesExhausted { attempts: 3 })
        ));
    }

    #[test]
    fn test_absent_read_guards_phantom_insert() {
        // Txn A observes "k" absent; a competing write lands before A
        // commits; A must abort and retry, then see the new value.
        let store = Store::new(5);
        let col: Collection<&str, i64> = Collection::new("numbers");

        let mut attempts = 0;
        let result: Result<i64, StoreError> = store.run(|txn| {
            attempts += 1;
            let seen = txn.get(&col, &"k");
            if attempts == 1 {
                // Competing committed write after the read, before commit.
                col.apply_put("k", 7);
            }
            txn.put(&col, "marker", 1);
            Ok(seen.unwrap_or(-1))
        });

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts, 2);
    }
}

//! Named collections of versioned documents.

use std::hash::Hash;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// A document together with its version counter.
///
/// The version starts at 1 and is bumped on every committed write, so a
/// transaction can detect that a document it read has changed underneath
/// it before commit.
#[derive(Debug, Clone)]
pub struct Versioned<V> {
    /// Monotonically increasing write counter.
    pub version: u64,
    /// The document itself.
    pub doc: V,
}

/// A named map of keys to versioned documents.
///
/// Reads never block commits; correctness comes from version validation
/// at commit time, not from read locks.
pub struct Collection<K, V> {
    name: &'static str,
    map: DashMap<K, Versioned<V>>,
}

impl<K, V> Collection<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty collection.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            map: DashMap::new(),
        }
    }

    /// The collection name, used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Snapshots a document and its version.
    pub(crate) fn read(&self, key: &K) -> Option<(u64, V)> {
        self.map.get(key).map(|e| (e.version, e.doc.clone()))
    }

    /// Returns the current version of a document, if present.
    pub(crate) fn version_of(&self, key: &K) -> Option<u64> {
        self.map.get(key).map(|e| e.version)
    }

    /// Applies a buffered write: bump-and-replace, or insert at version 1.
    ///
    /// Only called while the store commit lock is held.
    pub(crate) fn apply_put(&self, key: K, doc: V) {
        match self.map.entry(key) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.version += 1;
                entry.doc = doc;
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Versioned { version: 1, doc });
            }
        }
    }

    /// Returns true if a document exists under this key.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Reads the latest committed document outside any transaction.
    #[must_use]
    pub fn snapshot(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|e| e.doc.clone())
    }

    /// Clones every committed document, for read-side queries.
    ///
    /// Not transactional: concurrent commits may land between shards.
    #[must_use]
    pub fn scan(&self) -> Vec<V> {
        self.map.iter().map(|e| e.doc.clone()).collect()
    }

    /// Number of documents in the collection.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the collection holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_put_bumps_version() {
        let col: Collection<&str, i64> = Collection::new("numbers");
        col.apply_put("a", 1);
        assert_eq!(col.version_of(&"a"), Some(1));

        col.apply_put("a", 2);
        assert_eq!(col.version_of(&"a"), Some(2));
        assert_eq!(col.snapshot(&"a"), Some(2));
    }

    #[test]
    fn test_read_returns_version_and_doc() {
        let col: Collection<&str, String> = Collection::new("docs");
        assert!(col.read(&"missing").is_none());

        col.apply_put("k", "v".to_string());
        let (version, doc) = col.read(&"k").unwrap();
        assert_eq!(version, 1);
        assert_eq!(doc, "v");
    }

    #[test]
    fn test_scan_and_len() {
        let col: Collection<u32, u32> = Collection::new("pairs");
        assert!(col.is_empty());
        col.apply_put(1, 10);
        col.apply_put(2, 20);
        assert_eq!(col.len(), 2);

        let mut values = col.scan();
        values.sort_unstable();
        assert_eq!(values, vec![10, 20]);
    }
}

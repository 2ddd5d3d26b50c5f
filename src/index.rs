//! Key-to-id secondary index.
//!
//! [`PrefixIndex`] maps a lower-cased key to the set of contact ids carrying
//! that key. The store keeps one for name-word prefixes and one for full
//! email addresses. The underlying map is never handed out: callers get
//! owned copies of buckets, so nothing outside the index can corrupt it.

use std::collections::{HashMap, HashSet};

use crate::contact::ContactId;

/// Lower-cased key to contact-id buckets.
#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    buckets: HashMap<String, HashSet<ContactId>>,
}

impl PrefixIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Files `id` under every key in `keys`.
    pub fn add<I, K>(&mut self, keys: I, id: &ContactId)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.buckets
                .entry(key.as_ref().to_lowercase())
                .or_default()
                .insert(id.clone());
        }
    }

    /// Removes `id` from every key in `keys`, dropping buckets that empty out.
    pub fn remove<I, K>(&mut self, keys: I, id: &ContactId)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            let key = key.as_ref().to_lowercase();
            if let Some(set) = self.buckets.get_mut(&key) {
                set.remove(id);
                if set.is_empty() {
                    self.buckets.remove(&key);
                }
            }
        }
    }

    /// Ids filed under `key`, or an empty set.
    #[must_use]
    pub fn lookup(&self, key: &str) -> HashSet<ContactId> {
        self.buckets
            .get(&key.to_lowercase())
            .cloned()
            .unwrap_or_default()
    }

    /// Returns true if `id` is filed under `key`.
    #[must_use]
    pub fn contains(&self, key: &str, id: &ContactId) -> bool {
        self.buckets
            .get(&key.to_lowercase())
            .is_some_and(|set| set.contains(id))
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of (key, id) entries across all buckets.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.buckets.values().map(HashSet::len).sum()
    }

    /// Returns true if no key is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drops every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}

//! Group-by-key partitioning shared by every classification stage.

use std::hash::Hash;

use indexmap::IndexMap;

/// Items split by whether their key was unique.
///
/// Groups appear in the order their key was first seen, and members keep
/// their input order, so a fixed input always partitions the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionResult<K: Hash + Eq, T> {
    /// Items that were alone under their key.
    pub resolved: Vec<T>,
    /// Groups of two or more items sharing a key.
    pub deferred: IndexMap<K, Vec<T>>,
}

impl<K: Hash + Eq, T> PartitionResult<K, T> {
    /// Total number of items across both outputs.
    pub fn len(&self) -> usize {
        self.resolved.len() + self.deferred.values().map(Vec::len).sum::<usize>()
    }

    /// Check if the partition holds no items.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty() && self.deferred.is_empty()
    }

    /// Number of items still ambiguous after this partition.
    pub fn deferred_len(&self) -> usize {
        self.deferred.values().map(Vec::len).sum()
    }
}

impl<K: Hash + Eq, T> Default for PartitionResult<K, T> {
    fn default() -> Self {
        Self {
            resolved: Vec::new(),
            deferred: IndexMap::new(),
        }
    }
}

/// Group `items` by `key` and split singleton groups from the rest.
pub fn partition_by<K, T, I, F>(items: I, key: F) -> PartitionResult<K, T>
where
    K: Hash + Eq,
    I: IntoIterator<Item = T>,
    F: Fn(&T) -> K,
{
    let mut groups: IndexMap<K, Vec<T>> = IndexMap::new();
    for item in items {
        groups.entry(key(&item)).or_default().push(item);
    }

    let mut result = PartitionResult::default();
    for (k, mut members) in groups {
        if members.len() == 1 {
            result.resolved.extend(members.pop());
        } else {
            result.deferred.insert(k, members);
        }
    }
    result
}

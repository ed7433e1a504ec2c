//! Small shared utilities: a fast hasher alias and byte-oriented helpers.
//!
//! Mirrors the metamath-knife convention of routing every hash map through a
//! single alias so the hashing strategy can be swapped in one place.

use fnv::FnvBuildHasher;
use std::collections::{HashMap as StdHashMap, HashSet as StdHashSet};

/// `HashMap` keyed with the FNV hasher; script symbols and line numbers are
/// small and fixed-format, so FNV beats SipHash without any real tradeoff.
pub type HashMap<K, V> = StdHashMap<K, V, FnvBuildHasher>;
/// `HashSet` counterpart of [`HashMap`].
pub type HashSet<K> = StdHashSet<K, FnvBuildHasher>;

/// Builds an empty [`HashMap`].
pub fn new_map<K, V>() -> HashMap<K, V> {
    HashMap::default()
}

/// Builds an empty [`HashSet`].
pub fn new_set<K>() -> HashSet<K> {
    HashSet::default()
}

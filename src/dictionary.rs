//! The `Dictionary` contract shared by all four implementations, plus a
//! runtime selector for callers that choose an implementation by name.

use crate::avl_tree::BalancedTreeDictionary;
use crate::chained_hash::ChainedHashDictionary;
use crate::error::DictionaryError;
use crate::probing_hash::ProbingHashDictionary;
use crate::sorted_array::SortedArrayDictionary;
use core::fmt;
use core::hash::Hash;
use core::str::FromStr;

/// Uniform key-value contract.
///
/// Keys are unique. Absent keys are a normal outcome (`None`), never an
/// error. `size` counts live entries only. `iter` yields every live entry
/// exactly once, in ascending key order for the ordered implementations and
/// in bucket order for the hash tables; every call starts a fresh traversal.
///
/// The trait is object safe so callers can hold a `Box<dyn Dictionary<K, V>>`.
pub trait Dictionary<K, V> {
    /// Insert or overwrite; returns the value previously stored under `key`.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    fn search(&self, key: &K) -> Option<&V>;

    /// Delete `key`; returns the removed value.
    fn remove(&mut self, key: &K) -> Option<V>;

    fn size(&self) -> usize;

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_>;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn contains(&self, key: &K) -> bool {
        self.search(key).is_some()
    }
}

/// Which backing structure to build.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DictionaryKind {
    SortedArray,
    ChainedHash,
    ProbingHash,
    BalancedTree,
}

impl DictionaryKind {
    pub const ALL: [DictionaryKind; 4] = [
        DictionaryKind::SortedArray,
        DictionaryKind::ChainedHash,
        DictionaryKind::ProbingHash,
        DictionaryKind::BalancedTree,
    ];

    /// Build an empty dictionary of this kind with default parameters.
    pub fn create<K, V>(self) -> Box<dyn Dictionary<K, V>>
    where
        K: Ord + Hash + 'static,
        V: 'static,
    {
        match self {
            DictionaryKind::SortedArray => Box::new(SortedArrayDictionary::new()),
            DictionaryKind::ChainedHash => Box::new(ChainedHashDictionary::new()),
            DictionaryKind::ProbingHash => Box::new(ProbingHashDictionary::new()),
            DictionaryKind::BalancedTree => Box::new(BalancedTreeDictionary::new()),
        }
    }

    /// Whether `iter` yields keys in ascending order.
    pub fn is_ordered(self) -> bool {
        matches!(self, DictionaryKind::SortedArray | DictionaryKind::BalancedTree)
    }

    pub fn short_name(self) -> &'static str {
        match self {
            DictionaryKind::SortedArray => "SAD",
            DictionaryKind::ChainedHash => "LHD",
            DictionaryKind::ProbingHash => "OHD",
            DictionaryKind::BalancedTree => "BTD",
        }
    }
}

impl fmt::Display for DictionaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DictionaryKind::SortedArray => "SortedArrayDictionary",
            DictionaryKind::ChainedHash => "ChainedHashDictionary",
            DictionaryKind::ProbingHash => "ProbingHashDictionary",
            DictionaryKind::BalancedTree => "BalancedTreeDictionary",
        })
    }
}

/// Accepts the short shell names and the long names, case-insensitively.
impl FromStr for DictionaryKind {
    type Err = DictionaryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sad" | "sortedarray" | "sortedarraydictionary" => Ok(DictionaryKind::SortedArray),
            "lhd" | "chainedhash" | "linkedhashdictionary" | "chainedhashdictionary" => {
                Ok(DictionaryKind::ChainedHash)
            }
            "ohd" | "probinghash" | "openhashdictionary" | "probinghashdictionary" => {
                Ok(DictionaryKind::ProbingHash)
            }
            "btd" | "balancedtree" | "binarytreedictionary" | "balancedtreedictionary" => {
                Ok(DictionaryKind::BalancedTree)
            }
            other => Err(DictionaryError::invalid(format!(
                "unknown dictionary implementation `{}`",
                other
            ))),
        }
    }
}

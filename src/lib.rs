//! dictkit: one key-value `Dictionary` contract, four backing structures.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: interchangeable dictionaries that share one contract so callers
//!   (shells, loaders, benchmarks) never depend on the structure behind it.
//! - Implementations:
//!   - SortedArrayDictionary<K, V>: gapless array sorted by key; binary
//!     search lookups, O(n) shifting inserts/removals, doubling growth.
//!   - ChainedHashDictionary<K, V, S>: separate chaining over a prime number
//!     of buckets; rehashes to the next prime >= 2x when the average chain
//!     length exceeds the configured load factor.
//!   - ProbingHashDictionary<K, V, S>: open addressing with alternating
//!     quadratic probing over a prime capacity p = 3 (mod 4); tombstone
//!     deletion; grows before an insert once the load factor reaches 0.66.
//!   - BalancedTreeDictionary<K, V>: AVL tree in a slot-map arena with
//!     parent links; stackless in-order iteration.
//!
//! Contract
//! - `insert` overwrites and returns the previous value.
//! - `search`/`remove` on an absent key return `None`; that is not an error.
//! - `size` counts live entries, never backing capacity.
//! - `iter` yields each live entry once: ascending for the array and tree,
//!   bucket/slot order for the hash tables. Every call starts afresh.
//!
//! Constraints
//! - Single-threaded: every dictionary is `!Send`/`!Sync`.
//! - Non-reentrant: in debug builds, calling back into a dictionary from a
//!   key's `Eq`/`Hash`/`Ord` while an operation runs panics.
//! - Resizing is all-or-nothing: a new table is built and swapped in.
//!
//! Errors
//! - `DictionaryError::InvalidArgument` rejects malformed construction
//!   input (load factors out of range, capacities that overflow, unknown
//!   implementation names).
//! - Corrupted internal state (a probe walk with no free slot, a rotation
//!   missing its pivot child) panics.
//!
//! Logging
//! - Growth and rehash events are reported through the `log` facade at
//!   `debug` level; no logger is installed by this crate.

pub mod avl_tree;
pub mod chained_hash;
pub mod config;
pub mod dictionary;
mod dictionary_proptest;
pub mod entry;
pub mod error;
pub mod primes;
pub mod probing_hash;
mod reentrancy;
pub mod sorted_array;

// Public surface
pub use avl_tree::BalancedTreeDictionary;
pub use chained_hash::ChainedHashDictionary;
pub use config::{ChainedHashConfig, ProbingHashConfig};
pub use dictionary::{Dictionary, DictionaryKind};
pub use entry::Entry;
pub use error::DictionaryError;
pub use probing_hash::ProbingHashDictionary;
pub use sorted_array::SortedArrayDictionary;

//! ChainedHashDictionary: separate chaining over a prime number of buckets.

use crate::config::ChainedHashConfig;
use crate::dictionary::Dictionary;
use crate::entry::Entry;
use crate::error::DictionaryError;
use crate::primes::{grown_prime, next_prime};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

type Chain<K, V> = Vec<Entry<K, V>>;

/// Each bucket holds its entries in insertion order. The bucket count is
/// always prime, and every entry sits in the chain selected by its key's
/// hash at the current bucket count.
#[derive(Debug, Clone)]
pub struct ChainedHashDictionary<K, V, S = DefaultHashBuilder> {
    buckets: Vec<Chain<K, V>>,
    len: usize,
    max_load_factor: f64,
    hasher: S,
    reentrancy: DebugReentrancy,
}

#[inline]
fn bucket_of<S, Q>(hasher: &S, key: &Q, capacity: usize) -> usize
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    (hasher.hash_one(key) % capacity as u64) as usize
}

impl<K, V> ChainedHashDictionary<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Rounds `capacity` up to the next prime.
    ///
    /// # Panics
    /// If no prime `>= capacity` fits in `usize`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    pub fn with_config(config: ChainedHashConfig) -> Result<Self, DictionaryError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for ChainedHashDictionary<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ChainedHashDictionary<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(ChainedHashConfig::default().initial_capacity, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = next_prime(capacity).expect("capacity overflow");
        Self::from_parts(capacity, ChainedHashConfig::default().max_load_factor, hasher)
    }

    pub fn with_config_and_hasher(
        config: ChainedHashConfig,
        hasher: S,
    ) -> Result<Self, DictionaryError> {
        config.validate()?;
        let capacity = next_prime(config.initial_capacity).ok_or_else(|| {
            DictionaryError::invalid(format!(
                "no prime capacity >= {} fits in usize",
                config.initial_capacity
            ))
        })?;
        Ok(Self::from_parts(capacity, config.max_load_factor, hasher))
    }

    fn from_parts(capacity: usize, max_load_factor: f64, hasher: S) -> Self {
        Self {
            buckets: (0..capacity).map(|_| Vec::new()).collect(),
            len: 0,
            max_load_factor,
            hasher,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets; always prime.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.buckets.len() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn chain_index<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        bucket_of(&self.hasher, key, self.buckets.len())
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        let b = self.chain_index(&key);
        let chain = &mut self.buckets[b];
        if let Some(e) = chain.iter_mut().find(|e| *e.key() == key) {
            return Some(e.replace_value(value));
        }
        chain.push(Entry::new(key, value));
        self.len += 1;
        if self.load_factor() > self.max_load_factor {
            self.grow();
        }
        None
    }

    fn grow(&mut self) {
        match grown_prime(self.buckets.len()) {
            Some(new_capacity) => self.rehash(new_capacity),
            // Chains just get longer; lookups stay correct.
            None => log::warn!(
                "chained hash dictionary cannot grow past {} buckets",
                self.buckets.len()
            ),
        }
    }

    /// Rebuild into `new_capacity` buckets and swap the new table in.
    ///
    /// Every key is hashed before any entry moves, so a panicking `Hash`
    /// leaves the old table untouched.
    fn rehash(&mut self, new_capacity: usize) {
        let old_capacity = self.buckets.len();
        let targets: Vec<usize> = self
            .buckets
            .iter()
            .flatten()
            .map(|e| bucket_of(&self.hasher, e.key(), new_capacity))
            .collect();
        let mut buckets: Vec<Chain<K, V>> = (0..new_capacity).map(|_| Vec::new()).collect();
        for (entry, b) in self.buckets.drain(..).flatten().zip(targets) {
            buckets[b].push(entry);
        }
        self.buckets = buckets;
        log::debug!(
            "chained hash dictionary rehashed: {} -> {} buckets ({} entries)",
            old_capacity,
            new_capacity,
            self.len
        );
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        self.buckets[self.chain_index(key)]
            .iter()
            .find(|e| e.key().borrow() == key)
            .map(Entry::value)
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let b = self.chain_index(key);
        self.buckets[b]
            .iter_mut()
            .find(|e| e.key().borrow() == key)
            .map(Entry::value_mut)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.search(key).is_some()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let b = self.chain_index(key);
        let chain = &mut self.buckets[b];
        let pos = chain.iter().position(|e| e.key().borrow() == key)?;
        // `remove`, not `swap_remove`: chains keep insertion order.
        let (_k, v) = chain.remove(pos).into_parts();
        self.len -= 1;
        Some(v)
    }

    /// Bucket by bucket, then in insertion order within each chain.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.buckets.iter().flatten(),
            remaining: self.len,
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(crate::primes::is_prime(self.buckets.len()));
        let mut total = 0;
        for (b, chain) in self.buckets.iter().enumerate() {
            for e in chain {
                assert_eq!(self.chain_index(e.key()), b, "entry in wrong chain");
            }
            total += chain.len();
        }
        assert_eq!(total, self.len);
    }
}

pub struct Iter<'a, K, V> {
    it: core::iter::Flatten<core::slice::Iter<'a, Chain<K, V>>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let e = self.it.next()?;
        self.remaining -= 1;
        Some(e.pair())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V, S> Dictionary<K, V> for ChainedHashDictionary<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        ChainedHashDictionary::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        ChainedHashDictionary::search(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ChainedHashDictionary::remove(self, key)
    }

    fn size(&self) -> usize {
        self.len
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(ChainedHashDictionary::iter(self))
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashDictionary<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ChainedHashDictionary<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        d.extend(iter);
        d
    }
}

//! SortedArrayDictionary: gapless array sorted by key, binary search lookups.

use crate::dictionary::Dictionary;
use crate::entry::Entry;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::cmp::Ordering;

pub const DEFAULT_ARRAY_CAPACITY: usize = 16;

/// Entries kept strictly increasing by key. Insert and remove shift the
/// tail, so both are O(n); lookups are O(log n).
#[derive(Debug, Clone)]
pub struct SortedArrayDictionary<K, V> {
    entries: Vec<Entry<K, V>>,
    reentrancy: DebugReentrancy,
}

impl<K: Ord, V> SortedArrayDictionary<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_ARRAY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity.max(1)),
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// `Ok(i)`: key at `i`. `Err(i)`: where the key would go.
    fn locate<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (mut lo, mut hi) = (0usize, self.entries.len());
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.entries[mid].key().borrow().cmp(key) {
                Ordering::Less => lo = mid + 1,
                Ordering::Greater => hi = mid,
                Ordering::Equal => return Ok(mid),
            }
        }
        Err(lo)
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        match self.locate(&key) {
            Ok(i) => Some(self.entries[i].replace_value(value)),
            Err(i) => {
                self.grow_if_full();
                self.entries.insert(i, Entry::new(key, value));
                None
            }
        }
    }

    /// Doubles the backing storage when no free slot remains.
    fn grow_if_full(&mut self) {
        let cap = self.entries.capacity();
        if self.entries.len() == cap {
            self.entries.reserve_exact(cap.max(1));
            log::debug!(
                "sorted array dictionary grew: {} -> {} slots ({} entries)",
                cap,
                self.entries.capacity(),
                self.entries.len()
            );
        }
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        let i = self.locate(key).ok()?;
        Some(self.entries[i].value())
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        let i = self.locate(key).ok()?;
        Some(self.entries[i].value_mut())
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        self.locate(key).is_ok()
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        let i = self.locate(key).ok()?;
        let (_k, v) = self.entries.remove(i).into_parts();
        Some(v)
    }

    /// Front-to-back, so keys come out ascending.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.entries.iter(),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(self.entries.len() <= self.entries.capacity());
        assert!(
            self.entries.windows(2).all(|w| w[0].key() < w[1].key()),
            "keys out of order"
        );
    }
}

impl<K: Ord, V> Default for SortedArrayDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(Entry::pair)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K: Ord, V> Dictionary<K, V> for SortedArrayDictionary<K, V> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        SortedArrayDictionary::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        SortedArrayDictionary::search(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        SortedArrayDictionary::remove(self, key)
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(SortedArrayDictionary::iter(self))
    }
}

impl<K: Ord, V> Extend<(K, V)> for SortedArrayDictionary<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for SortedArrayDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        d.extend(iter);
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: keys stay strictly ascending regardless of insert order.
    #[test]
    fn iteration_is_sorted() {
        let mut d = SortedArrayDictionary::new();
        for k in [5, 1, 9, 3, 7, 2, 8] {
            assert_eq!(d.insert(k, k * 10), None);
        }
        let keys: Vec<i32> = d.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 2, 3, 5, 7, 8, 9]);
        assert_eq!(d.iter().len(), 7);
    }

    /// Invariant: overwrite returns the old value and leaves size unchanged.
    #[test]
    fn overwrite_in_place() {
        let mut d = SortedArrayDictionary::new();
        d.insert("a".to_string(), 1);
        assert_eq!(d.insert("a".to_string(), 2), Some(1));
        assert_eq!(d.len(), 1);
        assert_eq!(d.search("a"), Some(&2));
    }

    /// Invariant: removal closes the gap; later keys remain reachable.
    #[test]
    fn remove_shifts_left() {
        let mut d: SortedArrayDictionary<i32, i32> = (0..10).map(|i| (i, i)).collect();
        assert_eq!(d.remove(&0), Some(0));
        assert_eq!(d.remove(&5), Some(5));
        assert_eq!(d.remove(&9), Some(9));
        assert_eq!(d.remove(&5), None);
        let keys: Vec<i32> = d.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec![1, 2, 3, 4, 6, 7, 8]);
        for k in keys {
            assert_eq!(d.search(&k), Some(&k));
        }
    }

    /// Invariant: storage doubles when full; size never exceeds capacity.
    #[test]
    fn grows_by_doubling() {
        let mut d = SortedArrayDictionary::with_capacity(2);
        assert!(d.capacity() >= 2);
        for i in (0..100).rev() {
            d.insert(i, ());
            assert!(d.len() <= d.capacity());
        }
        assert!(d.capacity() >= 100);
        assert_eq!(d.iter().next(), Some((&0, &())));
    }

    #[test]
    fn search_mut_updates_value() {
        let mut d = SortedArrayDictionary::new();
        d.insert("x".to_string(), 1);
        *d.search_mut("x").unwrap() += 41;
        assert_eq!(d.search("x"), Some(&42));
        assert!(d.search_mut("y").is_none());
        assert!(d.contains_key("x"));
    }

    /// Invariant (debug-only): re-entering the dictionary from within `K: Ord`
    /// during a binary search panics; in release builds this test is skipped.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_ord_during_search() {
        use std::cmp::Ordering;

        struct ReentryKey {
            id: u32,
            map: *const SortedArrayDictionary<ReentryKey, i32>,
            trigger: bool,
        }
        impl ReentryKey {
            fn reenter(&self, other: &Self) {
                let caller = if self.trigger { self } else { other };
                if caller.trigger {
                    unsafe {
                        let m = &*caller.map;
                        let _ = m.contains_key(caller);
                    }
                }
            }
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }
        impl Eq for ReentryKey {}
        impl PartialOrd for ReentryKey {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }
        impl Ord for ReentryKey {
            fn cmp(&self, other: &Self) -> Ordering {
                self.reenter(other);
                self.id.cmp(&other.id)
            }
        }

        let mut m: SortedArrayDictionary<ReentryKey, i32> = SortedArrayDictionary::new();
        let key = ReentryKey {
            id: 1,
            map: &m as *const _,
            trigger: false,
        };
        m.insert(key, 1);

        let query = ReentryKey {
            id: 2,
            map: &m as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.search(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }

    #[test]
    fn empty_dictionary_behaviour() {
        let mut d: SortedArrayDictionary<i32, i32> = SortedArrayDictionary::with_capacity(0);
        assert!(d.is_empty());
        assert_eq!(d.search(&1), None);
        assert_eq!(d.remove(&1), None);
        assert_eq!(d.iter().next(), None);
    }
}

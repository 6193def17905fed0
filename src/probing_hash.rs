//! ProbingHashDictionary: open addressing with quadratic probing and
//! tombstone deletion.
//!
//! Capacity is always a prime `p` with `p % 4 == 3`. The walk from home slot
//! `h` visits `h, h+1, h-1, h+4, h-4, h+9, h-9, ...` (mod `p`). For such
//! primes the `+j^2` and `-j^2` offsets together hit every residue, so the
//! first `p` steps are a permutation of all slots: a walk never misses a
//! free slot and never loops.
//!
//! Removal leaves a tombstone so that walks for keys that probed past the
//! removed entry keep going. Tombstones are reused by inserts and dropped
//! wholesale when the table is rebuilt: on growth, or in place once live
//! entries and tombstones together reach the load threshold.

use crate::config::ProbingHashConfig;
use crate::dictionary::Dictionary;
use crate::entry::Entry;
use crate::error::DictionaryError;
use crate::primes::{grown_special_prime, next_special_prime};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

#[derive(Debug, Clone)]
enum Slot<K, V> {
    Empty,
    Tombstone,
    Occupied(Entry<K, V>),
}

/// Outcome of a probing walk.
enum Probe {
    /// Slot holding the key.
    Found(usize),
    /// Key absent; first tombstone seen, else the empty slot that ended the walk.
    Vacant(usize),
    /// Key absent and no reusable slot on the whole sequence.
    Exhausted,
}

/// Slot visited at `step` of the walk that starts at `home`.
#[inline]
pub(crate) fn probe(home: usize, step: usize, capacity: usize) -> usize {
    let cap = capacity as u128;
    let j = ((step as u128) + 1) / 2;
    let offset = j * j % cap;
    let slot = if step % 2 == 1 {
        (home as u128 + offset) % cap
    } else {
        (home as u128 + cap - offset) % cap
    };
    slot as usize
}

#[inline]
fn home_of<S, Q>(hasher: &S, key: &Q, capacity: usize) -> usize
where
    S: BuildHasher,
    Q: ?Sized + Hash,
{
    (hasher.hash_one(key) % capacity as u64) as usize
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Slot<K, V>> {
    (0..capacity).map(|_| Slot::Empty).collect()
}

#[derive(Debug, Clone)]
pub struct ProbingHashDictionary<K, V, S = DefaultHashBuilder> {
    slots: Vec<Slot<K, V>>,
    len: usize,
    tombstones: usize,
    max_load_factor: f64,
    hasher: S,
    reentrancy: DebugReentrancy,
}

impl<K, V> ProbingHashDictionary<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Rounds `capacity` up to the next prime congruent to 3 mod 4.
    ///
    /// # Panics
    /// If no such prime fits in `usize`.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }

    pub fn with_config(config: ProbingHashConfig) -> Result<Self, DictionaryError> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for ProbingHashDictionary<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ProbingHashDictionary<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(ProbingHashConfig::default().initial_capacity, hasher)
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        let capacity = next_special_prime(capacity).expect("capacity overflow");
        Self::from_parts(capacity, ProbingHashConfig::default().max_load_factor, hasher)
    }

    pub fn with_config_and_hasher(
        config: ProbingHashConfig,
        hasher: S,
    ) -> Result<Self, DictionaryError> {
        config.validate()?;
        let capacity = next_special_prime(config.initial_capacity).ok_or_else(|| {
            DictionaryError::invalid(format!(
                "no prime capacity >= {} with p % 4 == 3 fits in usize",
                config.initial_capacity
            ))
        })?;
        Ok(Self::from_parts(capacity, config.max_load_factor, hasher))
    }

    fn from_parts(capacity: usize, max_load_factor: f64, hasher: S) -> Self {
        Self {
            slots: empty_slots(capacity),
            len: 0,
            tombstones: 0,
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

    /// Number of slots; always a prime congruent to 3 mod 4.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Removed slots still on probe paths. They lengthen misses until the
    /// next insert that finds `len + tombstones` at the load threshold,
    /// which rebuilds the table and drops them.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.slots.len() as f64
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    fn home<Q>(&self, key: &Q) -> usize
    where
        Q: ?Sized + Hash,
    {
        home_of(&self.hasher, key, self.slots.len())
    }

    /// Share of slots that are not `Empty`.
    fn occupancy(&self) -> f64 {
        (self.len + self.tombstones) as f64 / self.slots.len() as f64
    }

    fn walk<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let cap = self.slots.len();
        let home = self.home(key);
        let mut tombstone = None;
        for step in 0..cap {
            let i = probe(home, step, cap);
            match &self.slots[i] {
                Slot::Empty => return Probe::Vacant(tombstone.unwrap_or(i)),
                Slot::Tombstone => {
                    if tombstone.is_none() {
                        tombstone = Some(i);
                    }
                }
                Slot::Occupied(e) => {
                    if e.key().borrow() == key {
                        return Probe::Found(i);
                    }
                }
            }
        }
        match tombstone {
            Some(i) => Probe::Vacant(i),
            None => Probe::Exhausted,
        }
    }

    fn entry_at(&self, i: usize) -> &Entry<K, V> {
        match &self.slots[i] {
            Slot::Occupied(e) => e,
            _ => panic!("probing walk reported slot {} as a match but it holds no entry", i),
        }
    }

    fn entry_at_mut(&mut self, i: usize) -> &mut Entry<K, V> {
        match &mut self.slots[i] {
            Slot::Occupied(e) => e,
            _ => panic!("probing walk reported slot {} as a match but it holds no entry", i),
        }
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        if self.load_factor() >= self.max_load_factor {
            self.grow();
        } else if self.occupancy() >= self.max_load_factor {
            self.rebuild(self.slots.len());
        }
        match self.walk(&key) {
            Probe::Found(i) => Some(self.entry_at_mut(i).replace_value(value)),
            Probe::Vacant(i) => {
                if let Slot::Tombstone = self.slots[i] {
                    self.tombstones -= 1;
                }
                self.slots[i] = Slot::Occupied(Entry::new(key, value));
                self.len += 1;
                None
            }
            Probe::Exhausted => panic!(
                "probing walk covered all {} slots without a free slot ({} live entries)",
                self.slots.len(),
                self.len
            ),
        }
    }

    /// Move to the next special prime at least twice as large.
    fn grow(&mut self) {
        let new_capacity = grown_special_prime(self.slots.len()).expect("capacity overflow");
        self.rebuild(new_capacity);
    }

    /// Reinsert every live entry into `new_capacity` fresh slots; tombstones
    /// are not carried over. Every key is hashed before any entry moves, so
    /// a panicking `Hash` leaves the old table untouched.
    fn rebuild(&mut self, new_capacity: usize) {
        let old_capacity = self.slots.len();
        let homes: Vec<Option<usize>> = self
            .slots
            .iter()
            .map(|slot| match slot {
                Slot::Occupied(e) => Some(home_of(&self.hasher, e.key(), new_capacity)),
                Slot::Empty | Slot::Tombstone => None,
            })
            .collect();
        let old = core::mem::replace(&mut self.slots, empty_slots(new_capacity));
        let discarded = core::mem::replace(&mut self.tombstones, 0);
        for (slot, home) in old.into_iter().zip(homes) {
            if let (Slot::Occupied(entry), Some(home)) = (slot, home) {
                self.place_fresh(home, entry);
            }
        }
        if new_capacity != old_capacity {
            log::debug!(
                "probing hash dictionary resized: {} -> {} slots ({} entries)",
                old_capacity,
                new_capacity,
                self.len
            );
        }
        if discarded > 0 {
            log::trace!("probing rebuild discarded {} tombstones", discarded);
        }
    }

    /// Place an entry known to be absent into a tombstone-free table.
    fn place_fresh(&mut self, home: usize, entry: Entry<K, V>) {
        let cap = self.slots.len();
        for step in 0..cap {
            let i = probe(home, step, cap);
            if let Slot::Empty = self.slots[i] {
                self.slots[i] = Slot::Occupied(entry);
                return;
            }
        }
        panic!("no empty slot among {} while rebuilding", cap);
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        match self.walk(key) {
            Probe::Found(i) => Some(self.entry_at(i).value()),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        match self.walk(key) {
            Probe::Found(i) => Some(self.entry_at_mut(i).value_mut()),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
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
        let i = match self.walk(key) {
            Probe::Found(i) => i,
            Probe::Vacant(_) | Probe::Exhausted => return None,
        };
        match core::mem::replace(&mut self.slots[i], Slot::Tombstone) {
            Slot::Occupied(e) => {
                self.len -= 1;
                self.tombstones += 1;
                Some(e.into_parts().1)
            }
            _ => panic!("probing walk reported slot {} as a match but it holds no entry", i),
        }
    }

    /// Slot order, skipping empty and tombstoned slots.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
            remaining: self.len,
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        assert!(crate::primes::is_special_prime(self.slots.len()));
        let live = self
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied(_)))
            .count();
        let dead = self
            .slots
            .iter()
            .filter(|s| matches!(s, Slot::Tombstone))
            .count();
        assert_eq!(live, self.len);
        assert_eq!(dead, self.tombstones);
        assert!(self.len <= self.slots.len());
    }
}

pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Slot<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        for slot in self.it.by_ref() {
            if let Slot::Occupied(e) = slot {
                self.remaining -= 1;
                return Some(e.pair());
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// One `index: key -> value` line per occupied slot.
impl<K, V, S> fmt::Display for ProbingHashDictionary<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if let Slot::Occupied(e) = slot {
                writeln!(f, "{}: {} -> {}", i, e.key(), e.value())?;
            }
        }
        Ok(())
    }
}

impl<K, V, S> Dictionary<K, V> for ProbingHashDictionary<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        ProbingHashDictionary::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        ProbingHashDictionary::search(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        ProbingHashDictionary::remove(self, key)
    }

    fn size(&self) -> usize {
        self.len
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(ProbingHashDictionary::iter(self))
    }
}

impl<K, V, S> Extend<(K, V)> for ProbingHashDictionary<K, V, S>
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

impl<K, V> FromIterator<(K, V)> for ProbingHashDictionary<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        d.extend(iter);
        d
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primes::is_special_prime;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::hash::Hasher;
    use std::rc::Rc;

    #[derive(Clone, Default, Debug)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        }
    }

    fn colliding(
        capacity: usize,
        max_load_factor: f64,
    ) -> ProbingHashDictionary<String, i32, ConstBuildHasher> {
        let cfg = ProbingHashConfig::default()
            .with_initial_capacity(capacity)
            .with_max_load_factor(max_load_factor);
        ProbingHashDictionary::with_config_and_hasher(cfg, ConstBuildHasher).unwrap()
    }

    /// Invariant: for every special prime and home slot, the first `p` steps
    /// of the walk visit each slot exactly once.
    #[test]
    fn probe_sequence_is_a_permutation() {
        for p in (3..400).filter(|&n| is_special_prime(n)) {
            for home in 0..p {
                let seen: BTreeSet<usize> = (0..p).map(|step| probe(home, step, p)).collect();
                assert_eq!(seen.len(), p, "p = {}, home = {}", p, home);
            }
        }
    }

    #[test]
    fn probe_order_alternates_offsets() {
        let walk: Vec<usize> = (0..7).map(|s| probe(0, s, 7)).collect();
        assert_eq!(walk, vec![0, 1, 6, 4, 3, 2, 5]);
    }

    /// Invariant: capacity is a prime congruent to 3 mod 4.
    #[test]
    fn capacity_is_special_prime() {
        for req in [0, 1, 4, 7, 12, 13, 100] {
            let d: ProbingHashDictionary<u32, u32> = ProbingHashDictionary::with_capacity(req);
            assert!(is_special_prime(d.capacity()));
            assert!(d.capacity() >= req);
        }
        assert_eq!(ProbingHashDictionary::<u32, u32>::new().capacity(), 7);
    }

    /// Invariant: the table grows before an insert once the load factor
    /// reaches the threshold; all entries survive and tombstones are dropped.
    #[test]
    fn grows_before_insert_and_discards_tombstones() {
        let mut d = ProbingHashDictionary::new();
        for i in 0..4u32 {
            d.insert(i, i);
        }
        assert_eq!(d.remove(&3), Some(3));
        assert_eq!(d.tombstones(), 1);
        d.insert(3, 3);
        d.insert(4, 4);
        // 5 / 7 >= 0.66 triggers growth on the next insert.
        assert_eq!(d.capacity(), 7);
        d.insert(5, 5);
        assert_eq!(d.capacity(), 19);
        assert_eq!(d.tombstones(), 0);
        d.assert_invariants();
        for i in 0..6u32 {
            assert_eq!(d.search(&i), Some(&i));
        }
    }

    /// Invariant: a walk continues past tombstones to find later keys; an
    /// overwrite of such a key updates it in place instead of filling the
    /// tombstone; a new key reuses the first tombstone.
    #[test]
    fn tombstones_keep_chains_intact() {
        let mut d = colliding(7, 0.9);
        d.insert("a".to_string(), 1);
        d.insert("b".to_string(), 2);
        d.insert("c".to_string(), 3);
        assert_eq!(d.to_string(), "0: a -> 1\n1: b -> 2\n6: c -> 3\n");

        assert_eq!(d.remove("b"), Some(2));
        assert_eq!(d.search("c"), Some(&3));
        assert_eq!(d.tombstones(), 1);

        assert_eq!(d.insert("c".to_string(), 30), Some(3));
        assert_eq!(d.len(), 2);
        assert_eq!(d.tombstones(), 1);

        assert_eq!(d.insert("d".to_string(), 4), None);
        assert_eq!(d.tombstones(), 0);
        assert_eq!(d.to_string(), "0: a -> 1\n1: d -> 4\n6: c -> 30\n");
        d.assert_invariants();
    }

    /// Invariant: with every key colliding, lookups terminate and report
    /// membership correctly right up to the load threshold.
    #[test]
    fn full_coverage_under_collisions() {
        let mut d = colliding(23, 0.95);
        let keys: Vec<String> = (0..21).map(|i| format!("k{}", i)).collect();
        for (i, k) in keys.iter().enumerate() {
            d.insert(k.clone(), i as i32);
        }
        assert_eq!(d.capacity(), 23);
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(d.search(k.as_str()), Some(&(i as i32)));
        }
        assert_eq!(d.search("missing"), None);
        for k in keys.iter().step_by(2) {
            assert!(d.remove(k.as_str()).is_some());
        }
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(d.search(k.as_str()).is_some(), i % 2 == 1);
        }
        d.assert_invariants();
    }

    /// Invariant: a table with no empty slot left still answers lookups for
    /// absent keys; the next insert purges the tombstone in place.
    #[test]
    fn full_table_answers_misses_then_purges() {
        let mut d = colliding(7, 0.9);
        for k in ["a", "b", "c", "d", "e", "f", "g"] {
            d.insert(k.to_string(), 0);
        }
        // 6 / 7 < 0.9, so the seventh key filled the last empty slot.
        assert_eq!(d.capacity(), 7);
        assert_eq!(d.len(), 7);
        assert_eq!(d.search("zz"), None);

        assert_eq!(d.remove("c"), Some(0));
        assert_eq!(d.search("zz"), None);
        // 6 / 7 < 0.9 but 7 / 7 occupied slots: rebuild at the same size.
        assert_eq!(d.insert("h".to_string(), 1), None);
        assert_eq!(d.tombstones(), 0);
        assert_eq!(d.capacity(), 7);
        for k in ["a", "b", "d", "e", "f", "g", "h"] {
            assert!(d.contains_key(k), "{}", k);
        }
        d.assert_invariants();

        d.insert("i".to_string(), 2);
        assert_eq!(d.capacity(), 19);
        assert_eq!(d.len(), 8);
        d.assert_invariants();
    }

    #[test]
    fn invalid_config_rejected() {
        for lf in [0.0, 1.0] {
            let cfg = ProbingHashConfig::default().with_max_load_factor(lf);
            assert!(matches!(
                ProbingHashDictionary::<u8, u8>::with_config(cfg),
                Err(DictionaryError::InvalidArgument(_))
            ));
        }
    }

    /// Invariant: insert/remove churn of distinct keys never fills the table
    /// with tombstones; misses keep ending at an empty slot.
    #[test]
    fn churn_keeps_an_empty_slot() {
        let mut d: ProbingHashDictionary<u32, u32> = ProbingHashDictionary::new();
        for k in 0..3 {
            d.insert(k, k);
        }
        for k in 3..500 {
            assert_eq!(d.insert(k, k), None);
            assert_eq!(d.remove(&k), Some(k));
            assert!(d.len() + d.tombstones() < d.capacity());
        }
        assert_eq!(d.capacity(), 7);
        d.assert_invariants();
        for k in 0..3 {
            assert_eq!(d.search(&k), Some(&k));
        }
    }

    /// Key whose `Hash` panics for id 0 while `armed` is set.
    struct ArmedKey {
        id: u32,
        armed: Rc<Cell<bool>>,
    }
    impl PartialEq for ArmedKey {
        fn eq(&self, other: &Self) -> bool {
            self.id == other.id
        }
    }
    impl Eq for ArmedKey {}
    impl Hash for ArmedKey {
        fn hash<H: Hasher>(&self, state: &mut H) {
            if self.id == 0 && self.armed.get() {
                panic!("hashing key 0 refused");
            }
            self.id.hash(state);
        }
    }

    /// Invariant: a `Hash` panic while growing leaves the old table whole;
    /// no live entry is lost and `len` still matches the slots.
    #[test]
    fn panicking_hash_during_growth_keeps_table() {
        let armed = Rc::new(Cell::new(false));
        let key = |id| ArmedKey {
            id,
            armed: Rc::clone(&armed),
        };
        let mut d = ProbingHashDictionary::new();
        for id in 0..5 {
            d.insert(key(id), id);
        }
        assert_eq!(d.capacity(), 7);

        armed.set(true);
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            d.insert(key(5), 5);
        }));
        assert!(res.is_err());
        armed.set(false);

        d.assert_invariants();
        assert_eq!(d.capacity(), 7);
        assert_eq!(d.len(), 5);
        assert_eq!(d.iter().count(), 5);
        for id in 0..5 {
            assert_eq!(d.search(&key(id)), Some(&id));
        }
        d.insert(key(5), 5);
        assert_eq!(d.capacity(), 19);
        d.assert_invariants();
    }

    /// Invariant (debug-only): re-entering the dictionary from within `K: Eq`
    /// during a probing walk panics; in release builds this test is skipped.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_walk() {
        struct ReentryKey {
            id: &'static str,
            map: *const ProbingHashDictionary<ReentryKey, i32, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    unsafe {
                        let m = &*other.map;
                        let _ = m.contains_key(self);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }

        let mut m: ProbingHashDictionary<ReentryKey, i32, ConstBuildHasher> =
            ProbingHashDictionary::with_hasher(ConstBuildHasher);
        let key = ReentryKey {
            id: "a",
            map: &m as *const _,
            trigger: false,
        };
        m.insert(key, 1);

        let query = ReentryKey {
            id: "b",
            map: &m as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.search(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }

    #[test]
    fn iteration_skips_dead_slots() {
        let mut d: ProbingHashDictionary<u32, u32> = (0..10).map(|i| (i, i)).collect();
        for i in (0..10).step_by(3) {
            d.remove(&i);
        }
        let seen: BTreeSet<u32> = d.iter().map(|(k, _)| *k).collect();
        assert_eq!(seen, [1, 2, 4, 5, 7, 8].into_iter().collect());
        assert_eq!(d.iter().len(), 6);
    }
}

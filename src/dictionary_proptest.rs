#![cfg(test)]

// Property tests for every dictionary kept inside the crate so they can call
// the crate-private invariant checkers after each operation.

use crate::avl_tree::BalancedTreeDictionary;
use crate::chained_hash::ChainedHashDictionary;
use crate::config::{ChainedHashConfig, ProbingHashConfig};
use crate::dictionary::Dictionary;
use crate::primes::{next_prime, next_special_prime};
use crate::probing_hash::ProbingHashDictionary;
use crate::sorted_array::SortedArrayDictionary;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::hash::{BuildHasher, Hasher};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Search(usize),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Search),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..200).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// What the state machine needs beyond the shared contract.
trait UnderTest: Dictionary<String, i32> {
    const ORDERED: bool;
    fn value_mut(&mut self, key: &str) -> Option<&mut i32>;
    fn check(&self);
}

impl UnderTest for SortedArrayDictionary<String, i32> {
    const ORDERED: bool = true;
    fn value_mut(&mut self, key: &str) -> Option<&mut i32> {
        self.search_mut(key)
    }
    fn check(&self) {
        self.assert_invariants();
    }
}

impl<S: BuildHasher> UnderTest for ChainedHashDictionary<String, i32, S> {
    const ORDERED: bool = false;
    fn value_mut(&mut self, key: &str) -> Option<&mut i32> {
        self.search_mut(key)
    }
    fn check(&self) {
        self.assert_invariants();
    }
}

impl<S: BuildHasher> UnderTest for ProbingHashDictionary<String, i32, S> {
    const ORDERED: bool = false;
    fn value_mut(&mut self, key: &str) -> Option<&mut i32> {
        self.search_mut(key)
    }
    fn check(&self) {
        self.assert_invariants();
    }
}

impl UnderTest for BalancedTreeDictionary<String, i32> {
    const ORDERED: bool = true;
    fn value_mut(&mut self, key: &str) -> Option<&mut i32> {
        self.search_mut(key)
    }
    fn check(&self) {
        self.assert_invariants();
    }
}

// Property: State-machine equivalence against std::collections::BTreeMap.
// Invariants exercised across random operation sequences:
// - `insert` returns the previous value exactly when the model had one.
// - `remove`/`search` agree with the model, including on absent keys.
// - `search_mut` updates are observed by later lookups.
// - `iter` yields each live entry once; ascending for ordered kinds.
// - `size` parity and structural invariants after every op.
fn run_state_machine<D: UnderTest>(
    mut sut: D,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<String, i32> = BTreeMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                prop_assert_eq!(sut.insert(k.clone(), v), model.insert(k, v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.remove(k), model.remove(k));
                prop_assert!(sut.search(k).is_none(), "removed key still found");
            }
            OpI::Search(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.search(k), model.get(k));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                match (sut.value_mut(k), model.get_mut(k)) {
                    (Some(a), Some(b)) => {
                        *a = a.wrapping_add(d);
                        *b = b.wrapping_add(d);
                    }
                    (None, None) => {}
                    (a, b) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", a, b),
                }
            }
            OpI::Iterate => {
                let mut got: Vec<(String, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                if !D::ORDERED {
                    got.sort();
                }
                let want: Vec<(String, i32)> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(got, want);
            }
        }

        // Post-conditions after each op
        prop_assert_eq!(sut.size(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.check();
    }
    Ok(())
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
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

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_sorted_array((pool, ops) in arb_scenario()) {
        run_state_machine(SortedArrayDictionary::with_capacity(1), &pool, ops)?;
    }

    #[test]
    fn prop_chained_hash((pool, ops) in arb_scenario()) {
        let cfg = ChainedHashConfig::default().with_initial_capacity(2).with_max_load_factor(1.0);
        run_state_machine(ChainedHashDictionary::with_config(cfg).unwrap(), &pool, ops)?;
    }

    #[test]
    fn prop_probing_hash((pool, ops) in arb_scenario()) {
        let cfg = ProbingHashConfig::default().with_initial_capacity(3);
        run_state_machine(ProbingHashDictionary::with_config(cfg).unwrap(), &pool, ops)?;
    }

    #[test]
    fn prop_balanced_tree((pool, ops) in arb_scenario()) {
        run_state_machine(BalancedTreeDictionary::new(), &pool, ops)?;
    }

    // Same invariants under worst-case collisions: every key shares one
    // chain, or one home slot and therefore one probe sequence.
    #[test]
    fn prop_chained_hash_with_collisions((pool, ops) in arb_scenario()) {
        let sut: ChainedHashDictionary<String, i32, ConstBuildHasher> =
            ChainedHashDictionary::with_hasher(ConstBuildHasher);
        run_state_machine(sut, &pool, ops)?;
    }

    #[test]
    fn prop_probing_hash_with_collisions((pool, ops) in arb_scenario()) {
        let cfg = ProbingHashConfig::default().with_max_load_factor(0.95);
        let sut: ProbingHashDictionary<String, i32, ConstBuildHasher> =
            ProbingHashDictionary::with_config_and_hasher(cfg, ConstBuildHasher).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: growing through several resizes is indistinguishable from
// building directly at the final capacity.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]

    #[test]
    fn prop_resize_transparency(keys in proptest::collection::vec(0u32..2_000, 0..400)) {
        let big = keys.len() * 4;
        let mut chained_small = ChainedHashDictionary::with_capacity(2);
        let mut chained_big = ChainedHashDictionary::with_capacity(next_prime(big).unwrap());
        let mut probing_small = ProbingHashDictionary::with_capacity(3);
        let mut probing_big =
            ProbingHashDictionary::with_capacity(next_special_prime(big).unwrap());
        let mut array_small = SortedArrayDictionary::with_capacity(1);
        for (i, &k) in keys.iter().enumerate() {
            chained_small.insert(k, i);
            chained_big.insert(k, i);
            probing_small.insert(k, i);
            probing_big.insert(k, i);
            array_small.insert(k, i);
        }
        chained_small.assert_invariants();
        probing_small.assert_invariants();
        for k in 0u32..2_000 {
            let want = chained_big.search(&k);
            prop_assert_eq!(chained_small.search(&k), want);
            prop_assert_eq!(probing_small.search(&k), want);
            prop_assert_eq!(probing_big.search(&k), want);
            prop_assert_eq!(array_small.search(&k), want);
        }
        prop_assert_eq!(chained_small.len(), chained_big.len());
        prop_assert_eq!(probing_small.len(), probing_big.len());
    }

    // Property: the AVL tree stays balanced with consistent parent links for
    // any interleaving of integer inserts and removes.
    #[test]
    fn prop_avl_balanced(ops in proptest::collection::vec((any::<bool>(), 0i32..64), 1..300)) {
        let mut t = BalancedTreeDictionary::new();
        let mut model = BTreeMap::new();
        for (is_insert, k) in ops {
            if is_insert {
                prop_assert_eq!(t.insert(k, k), model.insert(k, k));
            } else {
                prop_assert_eq!(t.remove(&k), model.remove(&k));
            }
            t.assert_invariants();
            prop_assert!(t.height() <= 2 * (64f64.log2() as i32));
        }
        let keys: Vec<i32> = t.iter().map(|(k, _)| *k).collect();
        let want: Vec<i32> = model.keys().copied().collect();
        prop_assert_eq!(keys, want);
    }
}

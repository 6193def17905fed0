//! BalancedTreeDictionary: AVL tree with parent links.
//!
//! Nodes live in a `SlotMap` arena and refer to each other by `NodeId`, which
//! lets every node carry a parent link without shared ownership. Parent links
//! make in-order iteration stackless: the successor of a node is the leftmost
//! node of its right subtree, or else the first ancestor reached from a left
//! child.
//!
//! Invariants after every public operation:
//! - BST order on keys; keys are unique.
//! - `height = 1 + max(height(left), height(right))`, absent child = -1.
//! - `|height(right) - height(left)| <= 1` at every node.
//! - `parent` of every node points at the node whose `left`/`right` holds
//!   it; the root alone has no parent.

use crate::dictionary::Dictionary;
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    struct NodeId;
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    height: i32,
    left: Option<NodeId>,
    right: Option<NodeId>,
    parent: Option<NodeId>,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            height: 0,
            left: None,
            right: None,
            parent: None,
        }
    }
}

type Arena<K, V> = SlotMap<NodeId, Node<K, V>>;

fn leftmost<K, V>(nodes: &Arena<K, V>, mut id: NodeId) -> NodeId {
    while let Some(l) = nodes[id].left {
        id = l;
    }
    id
}

fn successor<K, V>(nodes: &Arena<K, V>, id: NodeId) -> Option<NodeId> {
    if let Some(r) = nodes[id].right {
        return Some(leftmost(nodes, r));
    }
    let mut cur = id;
    while let Some(p) = nodes[cur].parent {
        if nodes[p].right == Some(cur) {
            cur = p;
        } else {
            return Some(p);
        }
    }
    None
}

#[derive(Debug, Clone)]
pub struct BalancedTreeDictionary<K, V> {
    nodes: Arena<K, V>,
    root: Option<NodeId>,
    reentrancy: DebugReentrancy,
}

impl<K: Ord, V> BalancedTreeDictionary<K, V> {
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree; -1 when empty, 0 for a single node.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    fn height_of(&self, id: Option<NodeId>) -> i32 {
        id.map_or(-1, |n| self.nodes[n].height)
    }

    fn balance_factor(&self, id: NodeId) -> i32 {
        let n = &self.nodes[id];
        self.height_of(n.right) - self.height_of(n.left)
    }

    fn update_height(&mut self, id: NodeId) {
        let n = &self.nodes[id];
        let h = 1 + self.height_of(n.left).max(self.height_of(n.right));
        self.nodes[id].height = h;
    }

    fn set_left(&mut self, parent: NodeId, child: Option<NodeId>) {
        self.nodes[parent].left = child;
        if let Some(c) = child {
            self.nodes[c].parent = Some(parent);
        }
    }

    fn set_right(&mut self, parent: NodeId, child: Option<NodeId>) {
        self.nodes[parent].right = child;
        if let Some(c) = child {
            self.nodes[c].parent = Some(parent);
        }
    }

    /// Point whatever referenced `old` (a parent's child slot, or the root)
    /// at `new` instead.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: NodeId) {
        match parent {
            None => self.root = Some(new),
            Some(g) => {
                let g = &mut self.nodes[g];
                if g.left == Some(old) {
                    g.left = Some(new);
                } else {
                    debug_assert_eq!(g.right, Some(old), "parent does not hold rotated node");
                    g.right = Some(new);
                }
            }
        }
        self.nodes[new].parent = parent;
    }

    //     p            q
    //    / \          / \
    //   q   c  ->    a   p
    //  / \              / \
    // a   b            b   c
    fn rotate_right(&mut self, p: NodeId) -> NodeId {
        let q = match self.nodes[p].left {
            Some(q) => q,
            None => panic!("right rotation on a node without a left child"),
        };
        let parent = self.nodes[p].parent;
        let inner = self.nodes[q].right;
        self.set_left(p, inner);
        self.set_right(q, Some(p));
        self.replace_child(parent, p, q);
        self.update_height(p);
        self.update_height(q);
        q
    }

    fn rotate_left(&mut self, p: NodeId) -> NodeId {
        let q = match self.nodes[p].right {
            Some(q) => q,
            None => panic!("left rotation on a node without a right child"),
        };
        let parent = self.nodes[p].parent;
        let inner = self.nodes[q].left;
        self.set_right(p, inner);
        self.set_left(q, Some(p));
        self.replace_child(parent, p, q);
        self.update_height(p);
        self.update_height(q);
        q
    }

    /// Refresh the height of `p` and rotate if it is out of balance.
    /// Returns the root of the (possibly new) subtree.
    fn rebalance(&mut self, p: NodeId) -> NodeId {
        self.update_height(p);
        match self.balance_factor(p) {
            -2 => {
                let l = self.nodes[p].left.expect("left-heavy node has a left child");
                if self.balance_factor(l) > 0 {
                    self.rotate_left(l);
                }
                self.rotate_right(p)
            }
            2 => {
                let r = self.nodes[p].right.expect("right-heavy node has a right child");
                if self.balance_factor(r) < 0 {
                    self.rotate_right(r);
                }
                self.rotate_left(p)
            }
            b => {
                debug_assert!((-1..=1).contains(&b), "balance factor {} out of range", b);
                p
            }
        }
    }

    fn find<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut cur = self.root;
        while let Some(id) = cur {
            let n = &self.nodes[id];
            cur = match key.cmp(n.key.borrow()) {
                Ordering::Less => n.left,
                Ordering::Greater => n.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    pub fn search<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        self.find(key).map(|id| &self.nodes[id].value)
    }

    pub fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        let id = self.find(key)?;
        Some(&mut self.nodes[id].value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter();
        let (root, old) = self.insert_below(self.root, key, value);
        self.root = Some(root);
        self.nodes[root].parent = None;
        old
    }

    /// Insert into the subtree at `at`; returns its new root and the
    /// overwritten value. An overwrite leaves the shape alone, so ancestors
    /// skip rebalancing.
    fn insert_below(&mut self, at: Option<NodeId>, key: K, value: V) -> (NodeId, Option<V>) {
        let p = match at {
            Some(p) => p,
            None => return (self.nodes.insert(Node::leaf(key, value)), None),
        };
        match key.cmp(&self.nodes[p].key) {
            Ordering::Equal => {
                let old = core::mem::replace(&mut self.nodes[p].value, value);
                (p, Some(old))
            }
            Ordering::Less => {
                let left = self.nodes[p].left;
                let (child, old) = self.insert_below(left, key, value);
                if old.is_some() {
                    return (p, old);
                }
                self.set_left(p, Some(child));
                (self.rebalance(p), None)
            }
            Ordering::Greater => {
                let right = self.nodes[p].right;
                let (child, old) = self.insert_below(right, key, value);
                if old.is_some() {
                    return (p, old);
                }
                self.set_right(p, Some(child));
                (self.rebalance(p), None)
            }
        }
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let _g = self.reentrancy.enter();
        let (root, removed) = self.remove_below(self.root, key);
        self.root = root;
        if let Some(r) = root {
            self.nodes[r].parent = None;
        }
        removed
    }

    /// Remove `key` from the subtree at `at`; returns the subtree's new root
    /// and the removed value. The caller re-links the returned root.
    fn remove_below<Q>(&mut self, at: Option<NodeId>, key: &Q) -> (Option<NodeId>, Option<V>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let p = match at {
            Some(p) => p,
            None => return (None, None),
        };
        match key.cmp(self.nodes[p].key.borrow()) {
            Ordering::Less => {
                let left = self.nodes[p].left;
                let (child, removed) = self.remove_below(left, key);
                if removed.is_none() {
                    return (Some(p), None);
                }
                self.set_left(p, child);
                (Some(self.rebalance(p)), removed)
            }
            Ordering::Greater => {
                let right = self.nodes[p].right;
                let (child, removed) = self.remove_below(right, key);
                if removed.is_none() {
                    return (Some(p), None);
                }
                self.set_right(p, child);
                (Some(self.rebalance(p)), removed)
            }
            Ordering::Equal => match (self.nodes[p].left, self.nodes[p].right) {
                (Some(_), Some(r)) => {
                    // Two children: the in-order successor's node is the one
                    // that leaves the arena; its key and value move into `p`.
                    let (right, succ) = self.take_min(r);
                    self.set_right(p, right);
                    let node = &mut self.nodes[p];
                    node.key = succ.key;
                    let old = core::mem::replace(&mut node.value, succ.value);
                    (Some(self.rebalance(p)), Some(old))
                }
                (left, right) => {
                    let node = self
                        .nodes
                        .remove(p)
                        .expect("node vanished from the arena during removal");
                    (left.or(right), Some(node.value))
                }
            },
        }
    }

    /// Unlink the minimum of the subtree at `p`; returns the subtree's new
    /// root and the detached node.
    fn take_min(&mut self, p: NodeId) -> (Option<NodeId>, Node<K, V>) {
        match self.nodes[p].left {
            Some(l) => {
                let (left, min) = self.take_min(l);
                self.set_left(p, left);
                (Some(self.rebalance(p)), min)
            }
            None => {
                let right = self.nodes[p].right;
                let node = self
                    .nodes
                    .remove(p)
                    .expect("successor vanished from the arena during removal");
                (right, node)
            }
        }
    }

    /// Ascending key order, driven by parent links.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            next: self.root.map(|r| leftmost(&self.nodes, r)),
            remaining: self.nodes.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        if let Some(r) = self.root {
            assert!(self.nodes[r].parent.is_none(), "root has a parent");
        }
        let mut count = 0;
        self.check_subtree(self.root, None, &mut count);
        assert_eq!(count, self.nodes.len(), "unreachable nodes in the arena");
        let keys: Vec<&K> = self.iter().map(|(k, _)| k).collect();
        assert_eq!(keys.len(), count);
        assert!(keys.windows(2).all(|w| w[0] < w[1]), "keys out of order");
    }

    #[cfg(test)]
    fn check_subtree(
        &self,
        at: Option<NodeId>,
        parent: Option<NodeId>,
        count: &mut usize,
    ) -> i32 {
        let id = match at {
            Some(id) => id,
            None => return -1,
        };
        let n = &self.nodes[id];
        assert_eq!(n.parent, parent, "broken parent link");
        *count += 1;
        let hl = self.check_subtree(n.left, Some(id), count);
        let hr = self.check_subtree(n.right, Some(id), count);
        assert!((hr - hl).abs() <= 1, "AVL balance violated");
        assert_eq!(n.height, 1 + hl.max(hr), "stale height");
        n.height
    }
}

impl<K: Ord, V> Default for BalancedTreeDictionary<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, K, V> {
    nodes: &'a Arena<K, V>,
    next: Option<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let nodes = self.nodes;
        self.next = successor(nodes, id);
        self.remaining -= 1;
        let n = &nodes[id];
        Some((&n.key, &n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Depth-indented dump: one `key value^parent` line per node, `|__` marking
/// each level and `#` standing in for a missing child next to a present one.
impl<K, V> fmt::Display for BalancedTreeDictionary<K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn level(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
            if depth > 0 {
                for _ in 1..depth {
                    f.write_str("   ")?;
                }
                f.write_str("|__")?;
            }
            Ok(())
        }

        fn node<K: fmt::Display, V: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            nodes: &Arena<K, V>,
            at: Option<NodeId>,
            depth: usize,
        ) -> fmt::Result {
            level(f, depth)?;
            let id = match at {
                Some(id) => id,
                None => return writeln!(f, "#"),
            };
            let n = &nodes[id];
            match n.parent {
                Some(p) => writeln!(f, "{} {}^{}", n.key, n.value, nodes[p].key)?,
                None => writeln!(f, "{} {}^null", n.key, n.value)?,
            }
            if n.left.is_some() || n.right.is_some() {
                node(f, nodes, n.left, depth + 1)?;
                node(f, nodes, n.right, depth + 1)?;
            }
            Ok(())
        }

        match self.root {
            Some(_) => node(f, &self.nodes, self.root, 0),
            None => Ok(()),
        }
    }
}

impl<K: Ord, V> Dictionary<K, V> for BalancedTreeDictionary<K, V> {
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BalancedTreeDictionary::insert(self, key, value)
    }

    fn search(&self, key: &K) -> Option<&V> {
        BalancedTreeDictionary::search(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BalancedTreeDictionary::remove(self, key)
    }

    fn size(&self) -> usize {
        self.len()
    }

    fn iter(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(BalancedTreeDictionary::iter(self))
    }
}

impl<K: Ord, V> Extend<(K, V)> for BalancedTreeDictionary<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BalancedTreeDictionary<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut d = Self::new();
        d.extend(iter);
        d
    }
}

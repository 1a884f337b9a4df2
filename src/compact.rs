//! Splay store over a dense, hole-free arena.
//!
//! Node identity is the array position. Deleting a node reclaims its slot by
//! relocating the last live node into it, so the arena never fragments; the
//! price is that raw positions are invalidated by every delete and must not
//! be cached across one.

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::element::{Aggregate, Payload, TreeItem};
use crate::SplayTree;

// The two bound nodes occupy the first two slots and are never relocated.
const MIN: u32 = 0;
const MAX: u32 = 1;

#[derive(Clone)]
struct Node<T: TreeItem> {
    child: [Option<u32>; 2],
    parent: Option<u32>,
    payload: Payload<T>,
}

/// Augmented splay tree over a dense relocating arena.
///
/// Same contract and splay machinery as
/// [`DynamicSplay`](crate::DynamicSplay), different lifetime management:
/// nodes and their aggregates live in parallel arrays with no holes, kept
/// compact by moving the last live slot into every freed position.
pub struct CompactSplay<T: TreeItem> {
    nodes: Vec<Node<T>>,
    aggs: Vec<Option<T::Aggregate>>,
    root: u32,
    index: HashMap<String, u32>,
}

impl<T: TreeItem> Default for CompactSplay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TreeItem> CompactSplay<T> {
    pub fn new() -> Self {
        let minv = Node {
            child: [None, Some(MAX)],
            parent: None,
            payload: Payload::Min,
        };
        let maxv = Node {
            child: [None; 2],
            parent: Some(MIN),
            payload: Payload::Max,
        };
        Self {
            nodes: vec![minv, maxv],
            aggs: vec![None, None],
            root: MIN,
            index: HashMap::new(),
        }
    }

    /// Inserts `item`, splaying it to the root, and returns `None`. If the
    /// key is already present the stored element is replaced in place,
    /// keeping its tree position, and the previous element is returned.
    pub fn insert(&mut self, item: T) -> Option<T> {
        if let Some(&i) = self.index.get(item.key()) {
            let fresh = item.make_aggregate();
            let old = std::mem::replace(&mut self.node_mut(i).payload, Payload::Item(item));
            self.aggs[i as usize] = Some(fresh);
            self.maintain(i);
            return old.into_item();
        }
        let agg = item.make_aggregate();
        let mut p = self.root;
        let side = loop {
            let k = self.route(&item, p);
            match self.node(p).child[k] {
                Some(c) => p = c,
                None => break k,
            }
        };
        let i = self.nodes.len() as u32;
        let key = item.key().to_string();
        self.nodes.push(Node {
            child: [None; 2],
            parent: Some(p),
            payload: Payload::Item(item),
        });
        self.aggs.push(Some(agg));
        self.node_mut(p).child[side] = Some(i);
        self.index.insert(key, i);
        self.splay(i, None);
        None
    }

    /// Removes the element stored under `key` and returns it. The last live
    /// slot is relocated into the freed position to keep the arena dense.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let i = self.index.remove(key)?;
        self.splay(i, None);
        let left = self.node(i).child[0].expect("lower bound lives in the left subtree");
        let right = self.node(i).child[1].expect("upper bound lives in the right subtree");
        let pre = self.extreme(left, 1);
        let nxt = self.extreme(right, 0);
        self.splay(pre, None);
        self.splay(nxt, Some(pre));
        self.node_mut(nxt).child[0] = None;
        self.maintain(nxt);
        self.maintain(pre);

        let last = self.nodes.len() as u32 - 1;
        let removed = self.nodes.swap_remove(i as usize);
        self.aggs.swap_remove(i as usize);
        if i != last {
            // The node formerly at `last` now sits at `i`; every reference
            // to its old position must be rewritten.
            let (parent, child) = {
                let moved = self.node(i);
                (moved.parent, moved.child)
            };
            if let Some(p) = parent {
                let side = usize::from(self.node(p).child[1] == Some(last));
                self.node_mut(p).child[side] = Some(i);
            }
            for c in child.into_iter().flatten() {
                self.node_mut(c).parent = Some(i);
            }
            if let Some(moved_key) = self.node(i).payload.item().map(|item| item.key().to_string()) {
                self.index.insert(moved_key, i);
            }
            if self.root == last {
                self.root = i;
            }
        }
        removed.payload.into_item()
    }

    /// Looks up the element stored under `key`. O(1), never rotates.
    pub fn get(&self, key: &str) -> Option<&T> {
        let &i = self.index.get(key)?;
        self.node(i).payload.item()
    }

    /// Regroups the tree so that every element ordered strictly below
    /// `probe` sits in one subtree, and returns that subtree's root element.
    pub fn partition(&mut self, probe: &T) -> Option<&T> {
        self.splay(MIN, None);
        let mut boundary = None;
        let mut cur = Some(self.root);
        while let Some(p) = cur {
            if self.route(probe, p) == 1 {
                cur = self.node(p).child[1];
            } else {
                boundary = Some(p);
                cur = self.node(p).child[0];
            }
        }
        let boundary = boundary.expect("descent ends at the upper bound");
        self.splay(boundary, Some(MIN));
        let below = self.node(boundary).child[0]?;
        self.node(below).payload.item()
    }

    /// Visits every stored element in ascending order.
    pub fn for_each(&self, mut visit: impl FnMut(&T)) {
        self.visit_inorder(Some(self.root), &mut visit);
    }

    /// Visits elements in ascending order until `visit` returns false, then
    /// abandons the rest of the walk.
    pub fn for_each_while(&self, mut visit: impl FnMut(&T) -> bool) {
        self.visit_while(Some(self.root), &mut visit);
    }

    /// Number of stored elements.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Renders the tree as an indented diagram, the greater side up, each
    /// element followed by its slot position and its aggregate.
    pub fn print_tree(&self) -> String {
        let mut out = format!("SplayRoot:root={}\n", self.root);
        self.render(self.root, "", true, &mut out);
        out
    }

    fn node(&self, i: u32) -> &Node<T> {
        &self.nodes[i as usize]
    }

    fn node_mut(&mut self, i: u32) -> &mut Node<T> {
        &mut self.nodes[i as usize]
    }

    fn route(&self, probe: &T, n: u32) -> usize {
        match &self.node(n).payload {
            Payload::Min => 1,
            Payload::Max => 0,
            Payload::Item(item) => usize::from(probe.sorts_after(item)),
        }
    }

    fn child_side(&self, x: u32, y: u32) -> usize {
        usize::from(self.node(y).child[1] == Some(x))
    }

    fn extreme(&self, start: u32, side: usize) -> u32 {
        let mut cur = start;
        while let Some(c) = self.node(cur).child[side] {
            cur = c;
        }
        cur
    }

    fn maintain(&mut self, i: u32) {
        let Some(mut agg) = self.aggs[i as usize].take() else {
            return;
        };
        let [left, right] = self.node(i).child;
        agg.maintain(
            left.and_then(|c| self.aggs[c as usize].as_ref()),
            right.and_then(|c| self.aggs[c as usize].as_ref()),
        );
        self.aggs[i as usize] = Some(agg);
    }

    fn rotate(&mut self, x: u32) {
        let y = self.node(x).parent.expect("rotated node has a parent");
        let z = self.node(y).parent;
        let k = self.child_side(x, y);
        if let Some(z) = z {
            let side = self.child_side(y, z);
            self.node_mut(z).child[side] = Some(x);
        }
        self.node_mut(x).parent = z;
        let moved = self.node(x).child[k ^ 1];
        self.node_mut(y).child[k] = moved;
        if let Some(m) = moved {
            self.node_mut(m).parent = Some(y);
        }
        self.node_mut(x).child[k ^ 1] = Some(y);
        self.node_mut(y).parent = Some(x);
        self.maintain(y);
        self.maintain(x);
    }

    fn splay(&mut self, x: u32, stop: Option<u32>) {
        while self.node(x).parent != stop {
            let y = self.node(x).parent.expect("splay target sits below its stop ancestor");
            let z = self.node(y).parent;
            if z != stop {
                let z = z.expect("stop ancestor bounds the splay path");
                if self.child_side(x, y) != self.child_side(y, z) {
                    self.rotate(x);
                } else {
                    self.rotate(y);
                }
            }
            self.rotate(x);
        }
        if stop.is_none() {
            self.root = x;
        }
    }

    fn visit_inorder(&self, n: Option<u32>, visit: &mut impl FnMut(&T)) {
        let Some(n) = n else { return };
        let node = self.node(n);
        self.visit_inorder(node.child[0], visit);
        if let Payload::Item(item) = &node.payload {
            visit(item);
        }
        self.visit_inorder(node.child[1], visit);
    }

    fn visit_while(&self, n: Option<u32>, visit: &mut impl FnMut(&T) -> bool) -> bool {
        let Some(n) = n else { return true };
        let node = self.node(n);
        if !self.visit_while(node.child[0], visit) {
            return false;
        }
        if let Payload::Item(item) = &node.payload {
            if !visit(item) {
                return false;
            }
        }
        self.visit_while(node.child[1], visit)
    }

    fn render(&self, n: u32, prefix: &str, is_bottom: bool, out: &mut String) {
        let node = self.node(n);
        if let Some(r) = node.child[1] {
            let next = format!("{prefix}{}", if is_bottom { "│   " } else { "    " });
            self.render(r, &next, false, out);
        }
        out.push_str(prefix);
        out.push_str(if is_bottom { "└── " } else { "┌── " });
        let _ = write!(out, "{}({n})", node.payload);
        if let Some(agg) = &self.aggs[n as usize] {
            let _ = write!(out, "[{agg}]");
        }
        out.push('\n');
        if let Some(l) = node.child[0] {
            let next = format!("{prefix}{}", if is_bottom { "    " } else { "│   " });
            self.render(l, &next, true, out);
        }
    }
}

impl<T: TreeItem + Clone> Clone for CompactSplay<T> {
    /// Deep copy: both arrays are copied in one pass and the key index is
    /// rebuilt from the copied nodes, skipping the two bound slots.
    fn clone(&self) -> Self {
        let nodes = self.nodes.clone();
        let aggs = self.aggs.clone();
        let mut index = HashMap::with_capacity(self.index.len());
        for (i, node) in nodes.iter().enumerate().skip(2) {
            if let Some(item) = node.payload.item() {
                index.insert(item.key().to_string(), i as u32);
            }
        }
        Self {
            nodes,
            aggs,
            root: self.root,
            index,
        }
    }
}

/// Keys in ascending order, each followed by a comma.
impl<T: TreeItem> fmt::Display for CompactSplay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.for_each(|item| {
            out.push_str(item.key());
            out.push(',');
        });
        f.write_str(&out)
    }
}

impl<T: TreeItem> SplayTree<T> for CompactSplay<T> {
    fn insert(&mut self, item: T) -> Option<T> {
        CompactSplay::insert(self, item)
    }

    fn remove(&mut self, key: &str) -> Option<T> {
        CompactSplay::remove(self, key)
    }

    fn get(&self, key: &str) -> Option<&T> {
        CompactSplay::get(self, key)
    }

    fn partition(&mut self, probe: &T) -> Option<&T> {
        CompactSplay::partition(self, probe)
    }

    fn for_each(&self, visit: impl FnMut(&T)) {
        CompactSplay::for_each(self, visit)
    }

    fn for_each_while(&self, visit: impl FnMut(&T) -> bool) {
        CompactSplay::for_each_while(self, visit)
    }

    fn len(&self) -> usize {
        CompactSplay::len(self)
    }

    fn print_tree(&self) -> String {
        CompactSplay::print_tree(self)
    }
}

#[cfg(test)]
mod tests {
    use super::CompactSplay;
    use crate::element::fixtures::{ranked, Ranked};
    use crate::element::TreeItem;

    #[test]
    fn empty_tree_renders_bounds_only() {
        let tree = CompactSplay::<Ranked>::new();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.to_string(), "");
        assert_eq!(
            tree.print_tree(),
            "SplayRoot:root=0\n│   ┌── Max(1)\n└── Min(0)\n"
        );
    }

    #[test]
    fn insert_get_remove() {
        let mut tree = CompactSplay::new();
        assert!(tree.insert(ranked(10, 1)).is_none());
        assert!(tree.insert(ranked(20, 2)).is_none());
        assert!(tree.insert(ranked(30, 3)).is_none());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.to_string(), "10,20,30,");
        assert_eq!(tree.get("30").map(|o| o.rank), Some(3));
        assert_eq!(tree.get("40"), None);

        assert_eq!(tree.remove("20").map(|o| o.rank), Some(2));
        assert_eq!(tree.remove("20"), None);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.to_string(), "10,30,");
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut tree = CompactSplay::new();
        tree.insert(ranked(10, 1));
        tree.insert(ranked(20, 2));
        let old = tree.insert(ranked(10, 9));
        assert_eq!(old.map(|o| o.rank), Some(1));
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get("10").map(|o| o.rank), Some(9));
        assert_eq!(tree.to_string(), "10,20,");
    }

    #[test]
    fn relocation_keeps_index_and_links_consistent() {
        let mut tree = CompactSplay::new();
        for i in 0..32u32 {
            tree.insert(ranked(i, i as i64));
        }
        // Delete from the middle outward so nearly every delete relocates a
        // slot that is still wired into the tree.
        for i in (8..24u32).chain(0..8).chain(24..32) {
            assert_eq!(tree.remove(&i.to_string()).map(|o| o.rank), Some(i as i64));
            // Every surviving key must still resolve through the index.
            let expected = tree.len();
            let mut seen = 0;
            tree.for_each(|o| {
                seen += 1;
                assert!(tree.get(&o.key).is_some());
            });
            assert_eq!(seen, expected);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.to_string(), "");
    }

    #[test]
    fn partition_gathers_lesser_elements() {
        let mut tree = CompactSplay::new();
        for i in 1..10 {
            tree.insert(ranked(i * 10, i as i64));
        }
        let probe = ranked(0, 5);
        let below = tree.partition(&probe).cloned();
        let below = below.expect("four elements rank below 5");
        assert!(probe.sorts_after(&below));
        let diagram = tree.print_tree();
        assert!(diagram.contains(&format!("── {}(", below.key)));
        assert_eq!(tree.len(), 9);
        assert_eq!(tree.to_string(), "10,20,30,40,50,60,70,80,90,");

        assert!(tree.partition(&ranked(0, 1)).is_none());
    }

    #[test]
    fn clone_is_independent_and_rebuilds_index() {
        let mut tree = CompactSplay::new();
        for i in 1..6 {
            tree.insert(ranked(i, i as i64));
        }
        let mut copy = tree.clone();
        assert_eq!(copy.to_string(), tree.to_string());
        assert_eq!(copy.print_tree(), tree.print_tree());

        copy.remove("2");
        copy.insert(ranked(7, 7));
        assert_eq!(tree.to_string(), "1,2,3,4,5,");
        assert_eq!(copy.to_string(), "1,3,4,5,7,");
        for i in 1..6 {
            assert!(tree.get(&i.to_string()).is_some());
        }
    }

    #[test]
    fn empty_partition_is_absent() {
        let mut tree = CompactSplay::<Ranked>::new();
        assert!(tree.partition(&ranked(0, 100)).is_none());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.to_string(), "");
    }
}

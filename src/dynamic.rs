//! Splay store with node-graph lifetime semantics.
//!
//! Nodes live in a free-list slot arena: a node keeps one stable handle from
//! insert to delete, and freed slots are recycled for later inserts. This is
//! the storage to pick when handles must survive unrelated deletions.

use std::collections::HashMap;
use std::fmt::{self, Write};

use crate::element::{Aggregate, Payload, TreeItem};
use crate::utils::slotvec::{SlotId, SlotVec};
use crate::SplayTree;

#[derive(Clone)]
struct Node<T: TreeItem> {
    // child[0] is the lesser side, child[1] the greater side.
    child: [Option<SlotId>; 2],
    parent: Option<SlotId>,
    payload: Payload<T>,
    // None exactly for the two bound nodes, so aggregate maintenance skips
    // them without identity checks.
    agg: Option<T::Aggregate>,
}

/// Augmented splay tree over a free-list slot arena.
///
/// Two permanent bound nodes enclose every stored element, so descents never
/// special-case an empty side: the minimum bound routes everything to its
/// right, the maximum bound routes everything to its left, and in-order
/// predecessors and successors always exist.
pub struct DynamicSplay<T: TreeItem> {
    nodes: SlotVec<Node<T>>,
    root: SlotId,
    minv: SlotId,
    maxv: SlotId,
    index: HashMap<String, SlotId>,
}

impl<T: TreeItem> Default for DynamicSplay<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: TreeItem> DynamicSplay<T> {
    pub fn new() -> Self {
        let mut nodes = SlotVec::new();
        let minv = nodes.insert(Node {
            child: [None; 2],
            parent: None,
            payload: Payload::Min,
            agg: None,
        });
        let maxv = nodes.insert(Node {
            child: [None; 2],
            parent: Some(minv),
            payload: Payload::Max,
            agg: None,
        });
        nodes[minv].child[1] = Some(maxv);
        Self {
            nodes,
            root: minv,
            minv,
            maxv,
            index: HashMap::new(),
        }
    }

    /// Inserts `item`, splaying it to the root, and returns `None`. If the
    /// key is already present the stored element is replaced in place,
    /// keeping its tree position, and the previous element is returned.
    pub fn insert(&mut self, item: T) -> Option<T> {
        if let Some(&id) = self.index.get(item.key()) {
            let fresh = item.make_aggregate();
            let node = &mut self.nodes[id];
            let old = std::mem::replace(&mut node.payload, Payload::Item(item));
            node.agg = Some(fresh);
            self.maintain(id);
            return old.into_item();
        }
        let agg = item.make_aggregate();
        let mut p = self.root;
        let side = loop {
            let k = self.route(&item, p);
            match self.nodes[p].child[k] {
                Some(c) => p = c,
                None => break k,
            }
        };
        let key = item.key().to_string();
        let id = self.nodes.insert(Node {
            child: [None; 2],
            parent: Some(p),
            payload: Payload::Item(item),
            agg: Some(agg),
        });
        self.nodes[p].child[side] = Some(id);
        self.index.insert(key, id);
        self.splay(id, None);
        None
    }

    /// Removes the element stored under `key` and returns it.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let id = self.index.remove(key)?;
        self.splay(id, None);
        // The bounds guarantee both neighbors exist, worst case they are the
        // bounds themselves.
        let left = self.nodes[id].child[0].expect("lower bound lives in the left subtree");
        let right = self.nodes[id].child[1].expect("upper bound lives in the right subtree");
        let pre = self.extreme(left, 1);
        let nxt = self.extreme(right, 0);
        self.splay(pre, None);
        self.splay(nxt, Some(pre));
        self.nodes[nxt].child[0] = None;
        self.maintain(nxt);
        self.maintain(pre);
        let node = self.nodes.remove(id)?;
        node.payload.into_item()
    }

    /// Looks up the element stored under `key`. O(1), never rotates.
    pub fn get(&self, key: &str) -> Option<&T> {
        let &id = self.index.get(key)?;
        self.nodes[id].payload.item()
    }

    /// Regroups the tree so that every element ordered strictly below
    /// `probe` sits in one subtree, and returns that subtree's root element.
    pub fn partition(&mut self, probe: &T) -> Option<&T> {
        self.splay(self.minv, None);
        let mut boundary = None;
        let mut cur = Some(self.root);
        while let Some(p) = cur {
            if self.route(probe, p) == 1 {
                cur = self.nodes[p].child[1];
            } else {
                boundary = Some(p);
                cur = self.nodes[p].child[0];
            }
        }
        // The upper bound routes to the lesser side, so a boundary is always
        // found.
        let boundary = boundary.expect("descent ends at the upper bound");
        self.splay(boundary, Some(self.minv));
        let below = self.nodes[boundary].child[0]?;
        self.nodes[below].payload.item()
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
    /// element followed by its aggregate in brackets.
    pub fn print_tree(&self) -> String {
        let mut out = String::from("SplayRoot\n");
        self.render(self.root, "", true, &mut out);
        out
    }

    fn route(&self, probe: &T, n: SlotId) -> usize {
        match &self.nodes[n].payload {
            Payload::Min => 1,
            Payload::Max => 0,
            Payload::Item(item) => usize::from(probe.sorts_after(item)),
        }
    }

    /// Which child slot of `y` holds `x`.
    fn child_side(&self, x: SlotId, y: SlotId) -> usize {
        usize::from(self.nodes[y].child[1] == Some(x))
    }

    /// Walks from `start` to the farthest node on `side`.
    fn extreme(&self, start: SlotId, side: usize) -> SlotId {
        let mut cur = start;
        while let Some(c) = self.nodes[cur].child[side] {
            cur = c;
        }
        cur
    }

    /// Recomputes the cached aggregate of `n` from its children. Absent and
    /// bound children contribute nothing.
    fn maintain(&mut self, n: SlotId) {
        let Some(mut agg) = self.nodes[n].agg.take() else {
            return;
        };
        let [left, right] = self.nodes[n].child;
        agg.maintain(
            left.and_then(|c| self.nodes[c].agg.as_ref()),
            right.and_then(|c| self.nodes[c].agg.as_ref()),
        );
        self.nodes[n].agg = Some(agg);
    }

    /// Single rotation promoting `x` above its parent, preserving the
    /// in-order sequence. Aggregates are rebuilt bottom-up: the demoted
    /// parent first, then `x`.
    fn rotate(&mut self, x: SlotId) {
        let y = self.nodes[x].parent.expect("rotated node has a parent");
        let z = self.nodes[y].parent;
        let k = self.child_side(x, y);
        if let Some(z) = z {
            let side = self.child_side(y, z);
            self.nodes[z].child[side] = Some(x);
        }
        self.nodes[x].parent = z;
        let moved = self.nodes[x].child[k ^ 1];
        self.nodes[y].child[k] = moved;
        if let Some(m) = moved {
            self.nodes[m].parent = Some(y);
        }
        self.nodes[x].child[k ^ 1] = Some(y);
        self.nodes[y].parent = Some(x);
        self.maintain(y);
        self.maintain(x);
    }

    /// Rotates `x` upward until its parent is `stop`, using the zig,
    /// zig-zig and zig-zag cases; `None` splays to the root and updates the
    /// root reference.
    fn splay(&mut self, x: SlotId, stop: Option<SlotId>) {
        while self.nodes[x].parent != stop {
            let y = self.nodes[x].parent.expect("splay target sits below its stop ancestor");
            let z = self.nodes[y].parent;
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

    fn visit_inorder(&self, n: Option<SlotId>, visit: &mut impl FnMut(&T)) {
        let Some(n) = n else { return };
        let node = &self.nodes[n];
        self.visit_inorder(node.child[0], visit);
        if let Payload::Item(item) = &node.payload {
            visit(item);
        }
        self.visit_inorder(node.child[1], visit);
    }

    fn visit_while(&self, n: Option<SlotId>, visit: &mut impl FnMut(&T) -> bool) -> bool {
        let Some(n) = n else { return true };
        let node = &self.nodes[n];
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

    fn render(&self, n: SlotId, prefix: &str, is_bottom: bool, out: &mut String) {
        let node = &self.nodes[n];
        if let Some(r) = node.child[1] {
            let next = format!("{prefix}{}", if is_bottom { "│   " } else { "    " });
            self.render(r, &next, false, out);
        }
        out.push_str(prefix);
        out.push_str(if is_bottom { "└── " } else { "┌── " });
        let _ = write!(out, "{}", node.payload);
        if let Some(agg) = &node.agg {
            let _ = write!(out, "[{agg}]");
        }
        out.push('\n');
        if let Some(l) = node.child[0] {
            let next = format!("{prefix}{}", if is_bottom { "    " } else { "│   " });
            self.render(l, &next, true, out);
        }
    }
}

impl<T: TreeItem + Clone> Clone for DynamicSplay<T> {
    /// Deep copy: fresh slots, aggregates cloned, shape and handles
    /// preserved exactly. The copy shares no mutable state with the source.
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            minv: self.minv,
            maxv: self.maxv,
            index: self.index.clone(),
        }
    }
}

/// Keys in ascending order, each followed by a comma.
impl<T: TreeItem> fmt::Display for DynamicSplay<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.for_each(|item| {
            out.push_str(item.key());
            out.push(',');
        });
        f.write_str(&out)
    }
}

impl<T: TreeItem> SplayTree<T> for DynamicSplay<T> {
    fn insert(&mut self, item: T) -> Option<T> {
        DynamicSplay::insert(self, item)
    }

    fn remove(&mut self, key: &str) -> Option<T> {
        DynamicSplay::remove(self, key)
    }

    fn get(&self, key: &str) -> Option<&T> {
        DynamicSplay::get(self, key)
    }

    fn partition(&mut self, probe: &T) -> Option<&T> {
        DynamicSplay::partition(self, probe)
    }

    fn for_each(&self, visit: impl FnMut(&T)) {
        DynamicSplay::for_each(self, visit)
    }

    fn for_each_while(&self, visit: impl FnMut(&T) -> bool) {
        DynamicSplay::for_each_while(self, visit)
    }

    fn len(&self) -> usize {
        DynamicSplay::len(self)
    }

    fn print_tree(&self) -> String {
        DynamicSplay::print_tree(self)
    }
}

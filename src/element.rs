//! Capability contract for stored elements.
//!
//! The tree knows nothing about the concrete element type; everything it
//! needs is expressed by [`TreeItem`] and its associated [`Aggregate`].

use std::fmt;

/// Per-node cached summary of the subtree rooted at that node, recomputed
/// bottom-up from the child summaries after every structural change.
pub trait Aggregate: Clone + fmt::Display {
    /// Recomputes this summary from the summaries of the two children.
    ///
    /// `None` stands for an absent child; the permanent bound nodes at the
    /// tree extremes are passed as `None` too, so implementations never see
    /// sentinel state. Must be a pure function of the child summaries and
    /// the element that produced this value, and must tolerate repeated
    /// invocation with the same children.
    fn maintain(&mut self, left: Option<&Self>, right: Option<&Self>);
}

/// Contract for elements stored in a splay tree.
pub trait TreeItem: fmt::Display {
    /// Summary cached alongside every stored element.
    type Aggregate: Aggregate;

    /// Unique key for this element, stable for its lifetime.
    fn key(&self) -> &str;

    /// Strict "orders after" relation driving the tree shape: true iff
    /// `self` is strictly greater than `other`.
    ///
    /// Must be a strict weak ordering. Distinct keys comparing as equal are
    /// placed by insertion path, which is not a stable public ordering; add
    /// a key tie-break here if a deterministic shape matters.
    fn sorts_after(&self, other: &Self) -> bool;

    /// Fresh summary seeded from this element alone, before any children
    /// are accounted for.
    fn make_aggregate(&self) -> Self::Aggregate;
}

/// What a tree node carries: one of the two permanent bounds, or a real
/// element. The bounds sit at the extremes of every in-order walk, carry no
/// aggregate, and never surface through lookups or traversal.
#[derive(Clone)]
pub(crate) enum Payload<T> {
    Min,
    Max,
    Item(T),
}

impl<T> Payload<T> {
    pub(crate) fn item(&self) -> Option<&T> {
        match self {
            Payload::Item(item) => Some(item),
            _ => None,
        }
    }

    pub(crate) fn into_item(self) -> Option<T> {
        match self {
            Payload::Item(item) => Some(item),
            _ => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Payload<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Min => f.write_str("Min"),
            Payload::Max => f.write_str("Max"),
            Payload::Item(item) => item.fmt(f),
        }
    }
}

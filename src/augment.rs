//! Per-subtree aggregates.
//!
//! A tree is parameterized by an [`Augment`] strategy deciding what, if anything, each node caches
//! about its subtree besides its height. Rotation and rebalancing are shared; only the recompute
//! step differs.

use core::fmt;

use crate::{Key, Sum};

/// A value cached at every node and recomputed from the node's key and its children's values.
pub trait Augment {
    type Value: Copy + PartialEq + fmt::Debug;

    /// Computes the value for a node with `key` whose children cache `left` and `right`.
    ///
    /// A missing child is passed as `None`.
    fn compute(key: Key, left: Option<Self::Value>, right: Option<Self::Value>) -> Self::Value;
}

/// No aggregate. Nodes cache only their height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plain {}

impl Augment for Plain {
    type Value = ();

    #[inline]
    fn compute(_key: Key, _left: Option<()>, _right: Option<()>) {}
}

/// Sum of all keys in the subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Summed {}

impl Augment for Summed {
    type Value = Sum;

    #[inline]
    fn compute(key: Key, left: Option<Sum>, right: Option<Sum>) -> Sum {
        Sum::from(key) + left.unwrap_or(0) + right.unwrap_or(0)
    }
}

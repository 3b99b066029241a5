//! A height-balanced (AVL) binary search tree with cached per-subtree aggregates.
//!
//! Nodes are stored in an arena owned by the tree and refer to each other through [`NodeId`]
//! handles, including a parent link used for upward traversal and rotation bookkeeping.
//!
// Conventions used in comments:
// - The height of a node `x` is denoted `h(x)`. A missing child has height -1 and a leaf has
//   height 0.
// - The balance factor of `x` is `h(left(x)) - h(right(x))`.
// - The aggregate of `x` is whatever the tree's `Augment` strategy caches for the subtree rooted
//   at `x`; for `Summed` this is the sum of its keys.
//
// The invariants, which hold whenever a public operation returns:
// 1. In-order traversal yields strictly ascending keys.
// 2. Every balance factor is -1, 0 or 1 (not guaranteed after `insert_unbalanced` or a manual
//    rotation).
// 3. Every cached height equals `max(h(left), h(right)) + 1`.
// 4. Every cached aggregate equals the one computed from the key and the children's aggregates.
// 5. Every child's parent link points back at the node holding it, and only the root has no
//    parent.

use core::{cmp::Ordering, fmt};

use tracing::{debug, trace};

pub mod augment;
mod error;
mod iter;
mod maintain;
mod node;
mod range;
mod rotate;

#[cfg(any(test, feature = "model"))]
pub mod model;

mod debug;


pub use augment::{Augment, Plain, Summed};
pub use error::TreeError;
pub use iter::{Iter, Keys};
pub use node::{Dir, NodeId, NodeRef};
pub use rotate::Rotation;

use node::{Link, Node};

/// The key type stored in the tree.
pub type Key = i64;

/// The type of [`Summed`] aggregates.
pub type Sum = i128;

/// An AVL tree of unique [`Key`]s, caching an aggregate chosen by `A` at every node.
///
/// `AvlTree<Plain>` caches heights only. `AvlTree<Summed>` additionally caches subtree key sums,
/// which back the _O(log(n))_ range queries [`sum_less`](AvlTree::sum_less) and
/// [`sum_greater`](AvlTree::sum_greater).
pub struct AvlTree<A: Augment = Plain> {
    nodes: Vec<Option<Node<A::Value>>>,
    free: Vec<usize>,
    root: Link,
    len: usize,
}

impl<A: Augment> AvlTree<A> {
    /// Returns a new empty tree.
    pub const fn new() -> AvlTree<A> {
        AvlTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns `true` if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        let empty = self.len() == 0;
        debug_assert_eq!(empty, self.root.is_none());
        empty
    }

    /// Returns the number of keys in the tree.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns the root node, or `None` if the tree is empty.
    pub fn root(&self) -> Option<NodeRef<'_, A>> {
        self.root.map(|id| NodeRef { tree: self, id })
    }

    /// Returns the height of the tree: -1 when empty, 0 for a single node.
    pub fn height(&self) -> i32 {
        self.height_of(self.root)
    }

    /// Returns a view of the node behind `id`, or `None` if it is not a live node of this tree.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_, A>> {
        self.is_live(id).then_some(NodeRef { tree: self, id })
    }

    /// Returns the node holding `key`.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn find(&self, key: Key) -> Option<NodeRef<'_, A>> {
        self.get_raw(key).map(|id| NodeRef { tree: self, id })
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains(&self, key: Key) -> bool {
        self.get_raw(key).is_some()
    }

    fn get_raw(&self, key: Key) -> Link {
        let mut opt_cur = self.root;

        loop {
            let cur = opt_cur?;
            let links = self.links(cur);

            match key.cmp(&links.key) {
                Ordering::Less => opt_cur = links.left(),
                Ordering::Equal => return Some(cur),
                Ordering::Greater => opt_cur = links.right(),
            }
        }
    }

    /// Returns the node with the minimum key.
    pub fn first(&self) -> Option<NodeRef<'_, A>> {
        let root = self.root?;
        Some(NodeRef {
            tree: self,
            id: self.min_in_subtree(root),
        })
    }

    /// Returns the node with the maximum key.
    pub fn last(&self) -> Option<NodeRef<'_, A>> {
        let mut cur = self.root?;

        while let Some(right) = self.links(cur).right() {
            cur = right;
        }

        Some(NodeRef { tree: self, id: cur })
    }

    /// Returns an iterator over the nodes of the tree in ascending key order.
    pub fn iter(&self) -> Iter<'_, A> {
        Iter::new(self)
    }

    /// Returns an iterator over the keys of the tree in ascending order.
    pub fn keys(&self) -> Keys<'_, A> {
        Keys::new(self)
    }

    /// Inserts `key` into the tree, rebalancing on the way back up.
    ///
    /// Returns the handle of the new node. A key that is already present is rejected with
    /// [`TreeError::DuplicateKey`] and the tree is left unchanged.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn insert(&mut self, key: Key) -> Result<NodeId, TreeError> {
        let id = self.attach(key)?;

        if let Some(parent) = self.links(id).parent {
            self.retrace(parent);
        }

        Ok(id)
    }

    /// Inserts `key` as a new leaf without rebalancing.
    ///
    /// Cached heights and aggregates are brought up to date, but the balance invariant may not
    /// hold afterwards. Duplicate keys are rejected as in [`insert`](AvlTree::insert).
    pub fn insert_unbalanced(&mut self, key: Key) -> Result<NodeId, TreeError> {
        let id = self.attach(key)?;
        self.update_heights(id);
        Ok(id)
    }

    // Attaches `key` as a leaf at the first empty child slot on its search path.
    fn attach(&mut self, key: Key) -> Result<NodeId, TreeError> {
        let Some(root) = self.root else {
            let id = self.alloc(Node::leaf(key, None, A::compute(key, None, None)));
            debug!(key, "inserted first key");
            self.root = Some(id);
            self.len += 1;
            return Ok(id);
        };

        let mut parent = root;

        // Descend the tree, looking for a free child slot.
        let dir = loop {
            let links = self.links(parent);

            let dir = match key.cmp(&links.key) {
                Ordering::Less => Dir::Left,
                Ordering::Equal => return Err(TreeError::DuplicateKey(key)),
                Ordering::Greater => Dir::Right,
            };

            match links.child(dir) {
                Some(child) => parent = child,
                None => break dir,
            }
        };

        let id = self.alloc(Node::leaf(key, Some(parent), A::compute(key, None, None)));
        self.links_mut(parent).set_child(dir, Some(id));
        self.len += 1;

        trace!(key, ?parent, ?dir, "attached leaf");

        Ok(id)
    }

    /// Removes `key` from the tree, rebalancing on the way back up.
    ///
    /// Returns `false`, leaving the tree untouched, if `key` is not present.
    ///
    /// This operation completes in _O(log(n))_ time.
    pub fn remove(&mut self, key: Key) -> bool {
        match self.get_raw(key) {
            Some(node) => {
                self.remove_at(node);
                true
            }
            None => {
                trace!(key, "key not present, nothing to remove");
                false
            }
        }
    }

    /// Removes and returns the minimum key.
    pub fn pop_first(&mut self) -> Option<Key> {
        let key = self.first()?.key();
        self.remove(key);
        Some(key)
    }

    /// Removes and returns the maximum key.
    pub fn pop_last(&mut self) -> Option<Key> {
        let key = self.last()?.key();
        self.remove(key);
        Some(key)
    }

    fn remove_at(&mut self, mut node: NodeId) {
        // There are three possible cases:
        //
        // 1. `node` is a leaf.
        //
        //    It is detached from its parent, which is where retracing starts. If it had no parent,
        //    the tree is now empty.
        //
        // 2. `node` has two children.
        //
        //    If the right child has no left child, it is the successor[^1]: its key moves into
        //    `node`, its right subtree takes its place, and retracing starts at `node`.
        //
        //    Otherwise the successor's key moves into `node` and the successor itself is removed.
        //    It has no left child by definition, so this falls into case 1 or 3.
        //
        // 3. `node` has one child.
        //
        //    The child's key and children move into `node` and the child is released. Retracing
        //    starts at `node`.
        //
        // [^1]: The successor of a node `a` is the least node in `a`'s right subtree.

        let mut rekeyed = None;

        let start = loop {
            let links = self.links(node);

            match (links.left(), links.right()) {
                (None, None) => {
                    let parent = links.parent;
                    self.replace_child_or_set_root(parent, node, None);
                    self.release(node);
                    break parent;
                }

                (Some(_), Some(right)) => {
                    if self.links(right).left().is_some() {
                        let successor = self.min_in_subtree(right);
                        let key = self.links(successor).key;
                        self.links_mut(node).key = key;
                        rekeyed = Some(node);
                        node = successor;
                        continue;
                    }

                    let successor = self.release(right);
                    let elevated = successor.right();

                    let links = self.links_mut(node);
                    links.key = successor.key;
                    links.set_child(Dir::Right, elevated);
                    self.maybe_set_parent(elevated, Some(node));

                    break Some(node);
                }

                (Some(child), None) | (None, Some(child)) => {
                    let absorbed = self.release(child);

                    let links = self.links_mut(node);
                    links.key = absorbed.key;
                    links.children = absorbed.children;

                    for grandchild in absorbed.children {
                        self.maybe_set_parent(grandchild, Some(node));
                    }

                    break Some(node);
                }
            }
        };

        self.len -= 1;

        match start {
            Some(start) => self.retrace(start),
            None => debug!("removed last key"),
        }

        // Retracing may stop below a node whose key was overwritten by its successor's, leaving
        // that node's aggregate stale.
        if let Some(rekeyed) = rekeyed {
            self.update_heights(rekeyed);
        }
    }

    /// Clears the tree, removing all keys.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.root = None;
        self.len = 0;
    }

    // Returns which child of its parent `id` is, or `None` if it is the root.
    pub(crate) fn child_direction(&self, id: NodeId) -> Option<Dir> {
        let parent = self.links(id).parent?;
        Some(self.which_child(parent, id))
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.assert_invariants_inner(true);
    }

    /// Checks every invariant except balance.
    #[doc(hidden)]
    pub fn assert_consistent(&self) {
        self.assert_invariants_inner(false);
    }

    fn assert_invariants_inner(&self, balanced: bool) {
        let live = self.nodes.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(live, self.len, "arena holds unreachable nodes");

        let Some(root) = self.root else {
            assert_eq!(self.len, 0);
            return;
        };

        assert_eq!(self.links(root).parent, None, "root must not have a parent");

        let (count, _, _) = self.assert_invariants_at(root, None, None, balanced);
        assert_eq!(count, self.len);
    }

    // Returns the node count, height and aggregate of the subtree, all recomputed from scratch.
    fn assert_invariants_at(
        &self,
        node: NodeId,
        lower: Option<Key>,
        upper: Option<Key>,
        balanced: bool,
    ) -> (usize, i32, A::Value) {
        let links = self.links(node);
        let key = links.key;

        // Ensure the key lies within the bounds set by its ancestors.
        if let Some(lower) = lower {
            assert!(lower < key, "{key} must be greater than {lower}");
        }
        if let Some(upper) = upper {
            assert!(key < upper, "{key} must be less than {upper}");
        }

        let mut count = 1;
        let mut heights = [-1; 2];
        let mut aggregates = [None; 2];

        for dir in [Dir::Left, Dir::Right] {
            if let Some(child) = links.child(dir) {
                // Ensure child's parent link points to this node.
                assert_eq!(self.links(child).parent, Some(node));

                let (lower, upper) = match dir {
                    Dir::Left => (lower, Some(key)),
                    Dir::Right => (Some(key), upper),
                };

                let (c, h, a) = self.assert_invariants_at(child, lower, upper, balanced);
                count += c;
                heights[dir as usize] = h;
                aggregates[dir as usize] = Some(a);
            }
        }

        let height = heights[0].max(heights[1]) + 1;
        let aggregate = A::compute(key, aggregates[0], aggregates[1]);

        assert_eq!(links.height, height, "stale height at key {key}");
        assert_eq!(links.aggregate, aggregate, "stale aggregate at key {key}");

        if balanced {
            let balance = heights[0] - heights[1];
            assert!(balance.abs() <= 1, "key {key} has balance factor {balance}");
        }

        (count, height, aggregate)
    }

    // Arena =================================================================

    fn alloc(&mut self, node: Node<A::Value>) -> NodeId {
        match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = Some(node);
                NodeId(idx)
            }
            None => {
                self.nodes.push(Some(node));
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(&mut self, id: NodeId) -> Node<A::Value> {
        let node = self.nodes[id.0].take().expect("node released twice");
        self.free.push(id.0);
        node
    }

    fn is_live(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    fn check_live(&self, id: NodeId) -> Result<(), TreeError> {
        if self.is_live(id) {
            Ok(())
        } else {
            Err(TreeError::StaleNode(id))
        }
    }

    #[inline]
    pub(crate) fn links(&self, id: NodeId) -> &Node<A::Value> {
        self.nodes[id.0].as_ref().expect("stale node handle")
    }

    #[inline]
    pub(crate) fn links_mut(&mut self, id: NodeId) -> &mut Node<A::Value> {
        self.nodes[id.0].as_mut().expect("stale node handle")
    }

    // Support methods ========================================================

    fn maybe_set_parent(&mut self, opt_node: Link, parent: Link) {
        let Some(node) = opt_node else {
            return;
        };

        self.links_mut(node).set_parent(parent);
    }

    // Points the slot of `parent` holding `old_child` at `new_child`, or makes `new_child` the
    // root if there is no parent.
    //
    // `new_child`'s parent pointer is not updated.
    fn replace_child_or_set_root(&mut self, parent: Link, old_child: NodeId, new_child: Link) {
        match parent {
            Some(parent) => {
                let dir = self.which_child(parent, old_child);
                self.links_mut(parent).set_child(dir, new_child);
            }
            None => {
                debug!(old = ?old_child, new = ?new_child, "replaced root");
                self.root = new_child;
            }
        }
    }

    pub(crate) fn which_child(&self, parent: NodeId, child: NodeId) -> Dir {
        let links = self.links(parent);

        if links.left() == Some(child) {
            Dir::Left
        } else {
            debug_assert_eq!(links.right(), Some(child), "not a child of `parent`");
            Dir::Right
        }
    }

    // Returns the leftmost node of the subtree rooted at `root`.
    #[inline]
    pub(crate) fn min_in_subtree(&self, root: NodeId) -> NodeId {
        let mut cur = root;

        while let Some(left) = self.links(cur).left() {
            cur = left;
        }

        cur
    }
}

impl<A: Augment> Default for AvlTree<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Augment> fmt::Debug for AvlTree<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<'tree, A: Augment> IntoIterator for &'tree AvlTree<A> {
    type Item = NodeRef<'tree, A>;
    type IntoIter = Iter<'tree, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<A: Augment> Extend<Key> for AvlTree<A> {
    /// Inserts every key, skipping duplicates.
    fn extend<I: IntoIterator<Item = Key>>(&mut self, keys: I) {
        for key in keys {
            let _ = self.insert(key);
        }
    }
}

impl<A: Augment> FromIterator<Key> for AvlTree<A> {
    fn from_iter<I: IntoIterator<Item = Key>>(keys: I) -> Self {
        let mut tree = AvlTree::new();
        tree.extend(keys);
        tree
    }
}

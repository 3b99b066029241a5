use core::{fmt, mem, ops::Not};

use crate::{augment::Augment, AvlTree, Key};

/// A handle to a node stored in an [`AvlTree`].
///
/// Handles stay valid until the node they name is removed. Removal may move a successor's key into
/// a surviving node, so the key behind a handle can change across a call to `remove`.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

pub(crate) type Link = Option<NodeId>;

/// Which child of its parent a node is, or which way a rotation turns.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dir {
    Left = 0,
    Right = 1,
}

impl Not for Dir {
    type Output = Dir;

    fn not(self) -> Self::Output {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

pub(crate) struct Node<V> {
    pub(crate) key: Key,
    pub(crate) parent: Link,
    pub(crate) children: [Link; 2],
    pub(crate) height: i32,
    pub(crate) aggregate: V,
}

impl<V> Node<V> {
    pub(crate) fn leaf(key: Key, parent: Link, aggregate: V) -> Self {
        Node {
            key,
            parent,
            children: [None; 2],
            height: 0,
            aggregate,
        }
    }

    #[inline]
    pub(crate) fn child(&self, dir: Dir) -> Link {
        self.children[dir as usize]
    }

    #[inline]
    pub(crate) fn left(&self) -> Link {
        self.child(Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Link {
        self.child(Dir::Right)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, dir: Dir, child: Link) -> Link {
        mem::replace(&mut self.children[dir as usize], child)
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Link) -> Link {
        mem::replace(&mut self.parent, parent)
    }
}

/// A read-only view of a node in an [`AvlTree`].
pub struct NodeRef<'tree, A: Augment> {
    pub(crate) tree: &'tree AvlTree<A>,
    pub(crate) id: NodeId,
}

impl<A: Augment> Clone for NodeRef<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: Augment> Copy for NodeRef<'_, A> {}

impl<'tree, A: Augment> NodeRef<'tree, A> {
    #[inline]
    fn node(&self) -> &'tree Node<A::Value> {
        self.tree.links(self.id)
    }

    #[inline]
    fn wrap(&self, link: Link) -> Option<NodeRef<'tree, A>> {
        link.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn key(&self) -> Key {
        self.node().key
    }

    /// Returns the cached height of the subtree rooted here. A leaf has height 0.
    pub fn height(&self) -> i32 {
        self.node().height
    }

    /// Returns the cached aggregate of the subtree rooted here.
    pub fn aggregate(&self) -> A::Value {
        self.node().aggregate
    }

    pub fn parent(&self) -> Option<NodeRef<'tree, A>> {
        self.wrap(self.node().parent)
    }

    pub fn left(&self) -> Option<NodeRef<'tree, A>> {
        self.wrap(self.node().left())
    }

    pub fn right(&self) -> Option<NodeRef<'tree, A>> {
        self.wrap(self.node().right())
    }

    /// Returns which child of its parent this node is, or `None` for the root.
    pub fn child_direction(&self) -> Option<Dir> {
        self.tree.child_direction(self.id)
    }

    /// Returns the leftmost node of the subtree rooted here.
    pub fn min(&self) -> NodeRef<'tree, A> {
        NodeRef {
            tree: self.tree,
            id: self.tree.min_in_subtree(self.id),
        }
    }

    /// Returns `height(left) - height(right)`.
    pub fn balance_factor(&self) -> i32 {
        self.tree.balance_factor(self.id)
    }
}

impl<A: Augment> fmt::Debug for NodeRef<'_, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("key", &self.key())
            .field("height", &self.height())
            .field("aggregate", &self.aggregate())
            .finish()
    }
}

use crate::{augment::Augment, node::Link, AvlTree, Dir, Key, NodeRef};

enum CameFrom {
    Parent,
    LeftChild,
    Here,
    RightChild,
}

/// An in-order iterator over the nodes of an [`AvlTree`].
///
/// The iterator follows parent links instead of keeping a stack, so it uses constant space
/// regardless of the height of the tree.
pub struct Iter<'tree, A: Augment> {
    tree: &'tree AvlTree<A>,

    front_cur: Link,
    front_from: CameFrom,

    len: usize,
}

impl<'tree, A: Augment> Iter<'tree, A> {
    pub(crate) fn new(tree: &'tree AvlTree<A>) -> Self {
        Iter {
            tree,

            front_cur: tree.root,
            front_from: CameFrom::Parent,
            len: tree.len(),
        }
    }
}

impl<'tree, A: Augment> Iterator for Iter<'tree, A> {
    type Item = NodeRef<'tree, A>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let tree = self.tree;
        let mut cur = self.front_cur?;

        loop {
            match self.front_from {
                CameFrom::Parent => {
                    // Upon entering a new subtree, find the minimum element.
                    cur = tree.min_in_subtree(cur);

                    // Once the minimum is found, its (empty) left subtree has been exhausted.
                    self.front_from = CameFrom::LeftChild;
                }

                CameFrom::LeftChild => {
                    // The left subtree has been exhausted, so this node is up next. Save off the
                    // iterator state and return it.
                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::Here;
                    self.len -= 1;

                    return Some(NodeRef { tree, id: cur });
                }

                CameFrom::Here => {
                    let links = tree.links(cur);

                    // The current node was just yielded.
                    if let Some(right) = links.right() {
                        // If the right subtree is not empty, go there.
                        self.front_from = CameFrom::Parent;

                        cur = right;
                    } else if let Some(parent) = links.parent {
                        // Otherwise, ascend one level.
                        self.front_from = match tree.which_child(parent, cur) {
                            Dir::Left => CameFrom::LeftChild,
                            Dir::Right => CameFrom::RightChild,
                        };

                        cur = parent;
                    } else {
                        unreachable!("iterator ran past the last node")
                    }
                }

                CameFrom::RightChild => {
                    // Ascend until we find the successor element.
                    while let Some(parent) = tree.links(cur).parent {
                        match tree.which_child(parent, cur) {
                            Dir::Left => {
                                cur = parent;
                                break;
                            }
                            Dir::Right => cur = parent,
                        }
                    }

                    self.front_cur = Some(cur);
                    self.front_from = CameFrom::LeftChild;
                }
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<A: Augment> ExactSizeIterator for Iter<'_, A> {}

/// An iterator over the keys of an [`AvlTree`] in ascending order.
pub struct Keys<'tree, A: Augment> {
    inner: Iter<'tree, A>,
}

impl<'tree, A: Augment> Keys<'tree, A> {
    pub(crate) fn new(tree: &'tree AvlTree<A>) -> Self {
        Keys {
            inner: Iter::new(tree),
        }
    }
}

impl<A: Augment> Iterator for Keys<'_, A> {
    type Item = Key;

    fn next(&mut self) -> Option<Key> {
        self.inner.next().map(|node| node.key())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<A: Augment> ExactSizeIterator for Keys<'_, A> {}

//! Prefix and suffix sums over a [`Summed`] tree.
//!
//! Both queries descend a single root-to-leaf path, adding up cached subtree sums on the side
//! being kept, so they complete in _O(log(n))_ time.

use core::cmp::Ordering;

use crate::{augment::Summed, node::Link, AvlTree, Key, Sum, TreeError};

impl AvlTree<Summed> {
    /// Returns the sum of every key in the tree, or 0 if it is empty.
    pub fn sum(&self) -> Sum {
        self.sum_of(self.root)
    }

    /// Returns the sum of all keys strictly less than `key`.
    ///
    /// Fails with [`TreeError::EmptyTree`] if the tree has no nodes.
    pub fn sum_less(&self, key: Key) -> Result<Sum, TreeError> {
        let root = self.root.ok_or(TreeError::EmptyTree)?;
        Ok(self.sum_less_at(Some(root), key))
    }

    /// Returns the sum of all keys strictly greater than `key`.
    ///
    /// Fails with [`TreeError::EmptyTree`] if the tree has no nodes.
    pub fn sum_greater(&self, key: Key) -> Result<Sum, TreeError> {
        let root = self.root.ok_or(TreeError::EmptyTree)?;
        Ok(self.sum_greater_at(Some(root), key))
    }

    #[inline]
    fn sum_of(&self, link: Link) -> Sum {
        link.map_or(0, |id| self.links(id).aggregate)
    }

    fn sum_less_at(&self, link: Link, key: Key) -> Sum {
        let Some(id) = link else {
            return 0;
        };

        let links = self.links(id);

        match links.key.cmp(&key) {
            // This node and its whole left subtree are below `key`.
            Ordering::Less => {
                Sum::from(links.key)
                    + self.sum_of(links.left())
                    + self.sum_less_at(links.right(), key)
            }
            Ordering::Equal => self.sum_of(links.left()),
            Ordering::Greater => self.sum_less_at(links.left(), key),
        }
    }

    fn sum_greater_at(&self, link: Link, key: Key) -> Sum {
        let Some(id) = link else {
            return 0;
        };

        let links = self.links(id);

        match links.key.cmp(&key) {
            Ordering::Greater => {
                Sum::from(links.key)
                    + self.sum_of(links.right())
                    + self.sum_greater_at(links.left(), key)
            }
            Ordering::Equal => self.sum_of(links.right()),
            Ordering::Less => self.sum_greater_at(links.right(), key),
        }
    }
}

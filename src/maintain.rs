//! Cached height and aggregate maintenance.

use tracing::trace;

use crate::{augment::Augment, node::Link, AvlTree, NodeId, TreeError};

impl<A: Augment> AvlTree<A> {
    /// Returns the cached height of the linked node, or -1 if there is none.
    #[inline]
    pub(crate) fn height_of(&self, link: Link) -> i32 {
        link.map_or(-1, |id| self.links(id).height)
    }

    #[inline]
    fn aggregate_of(&self, link: Link) -> Option<A::Value> {
        link.map(|id| self.links(id).aggregate)
    }

    pub(crate) fn balance_factor(&self, id: NodeId) -> i32 {
        let links = self.links(id);
        self.height_of(links.left()) - self.height_of(links.right())
    }

    // Recomputes the height and aggregate of `id` from its children's cached values.
    //
    // Returns `true` if either value changed.
    pub(crate) fn recompute(&mut self, id: NodeId) -> bool {
        let links = self.links(id);
        let (key, left, right) = (links.key, links.left(), links.right());

        let height = self.height_of(left).max(self.height_of(right)) + 1;
        let aggregate = A::compute(key, self.aggregate_of(left), self.aggregate_of(right));

        let links = self.links_mut(id);
        let changed = links.height != height || links.aggregate != aggregate;
        links.height = height;
        links.aggregate = aggregate;

        changed
    }

    // Walks from `start` towards the root, restoring balance and refreshing caches.
    //
    // A node that is out of balance is rotated and replaced in the walk by the new local root.
    // The walk stops as soon as a processed subtree reports the same height and aggregate as
    // before, since nothing above it can have changed.
    pub(crate) fn retrace(&mut self, start: NodeId) {
        let mut cur = start;

        loop {
            let links = self.links(cur);
            let (old_height, old_aggregate) = (links.height, links.aggregate);

            cur = match self.rotation_needed(cur) {
                Some(rotation) => self.rotate(cur, rotation),
                None => {
                    self.recompute(cur);
                    cur
                }
            };

            let links = self.links(cur);
            if links.height == old_height && links.aggregate == old_aggregate {
                trace!(node = ?cur, "subtree unchanged, stopping retrace");
                return;
            }

            match links.parent {
                Some(parent) => cur = parent,
                None => return,
            }
        }
    }

    // Recomputes `id`, then its ancestors for as long as their cached values turn out stale.
    //
    // Never rotates.
    pub(crate) fn update_heights(&mut self, id: NodeId) {
        self.recompute(id);

        let mut cur = id;
        while let Some(parent) = self.links(cur).parent {
            if !self.recompute(parent) {
                break;
            }

            cur = parent;
        }
    }

    /// Refreshes the cached height and aggregate of `id` and of every ancestor whose cache is
    /// stale as a result, without rebalancing.
    ///
    /// Rotations performed through [`rotate_small`](AvlTree::rotate_small) and
    /// [`rotate_grand`](AvlTree::rotate_grand) only refresh the rotated nodes; call this on the
    /// returned node afterwards.
    pub fn propagate(&mut self, id: NodeId) -> Result<(), TreeError> {
        self.check_live(id)?;
        self.update_heights(id);
        Ok(())
    }
}

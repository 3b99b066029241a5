//! Single and double rotations.
//!
//! Every rotation rewires a constant number of links, refreshes the caches of the nodes it moved
//! (lowest first), and returns the node now occupying the rotated node's place. The caches of
//! ancestors are left alone.

use tracing::trace;

use crate::{augment::Augment, AvlTree, Dir, NodeId, TreeError};

/// A rotation restoring the balance of a node whose balance factor has reached ±2.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Rotation {
    /// A single rotation turning in the given direction. `Small(Dir::Right)` lifts the left child.
    Small(Dir),
    /// A double rotation turning in the given direction. `Grand(Dir::Right)` lifts the right
    /// child of the left child.
    Grand(Dir),
}

impl<A: Augment> AvlTree<A> {
    /// Returns the rotation that rebalances `id`, or `None` if its balance factor is within
    /// `-1..=1`.
    ///
    /// Ties between the taller child's two subtrees pick the single rotation.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a live node of this tree.
    pub fn rotation_needed(&self, id: NodeId) -> Option<Rotation> {
        let links = self.links(id);

        match self.balance_factor(id) {
            2.. => {
                let left = self.links(links.left()?);
                if self.height_of(left.left()) >= self.height_of(left.right()) {
                    Some(Rotation::Small(Dir::Right))
                } else {
                    Some(Rotation::Grand(Dir::Right))
                }
            }

            ..=-2 => {
                let right = self.links(links.right()?);
                if self.height_of(right.left()) <= self.height_of(right.right()) {
                    Some(Rotation::Small(Dir::Left))
                } else {
                    Some(Rotation::Grand(Dir::Left))
                }
            }

            _ => None,
        }
    }

    pub(crate) fn rotate(&mut self, node: NodeId, rotation: Rotation) -> NodeId {
        match rotation {
            Rotation::Small(dir) => self.rotate_small_at(node, dir),
            Rotation::Grand(dir) => self.rotate_grand_at(node, dir),
        }
    }

    /// Performs a single rotation at `node` turning in direction `dir`.
    ///
    /// The `!dir` child of `node` takes its place and `node` becomes that child's `dir` child.
    /// Returns the node now in `node`'s place.
    pub fn rotate_small(&mut self, node: NodeId, dir: Dir) -> Result<NodeId, TreeError> {
        self.check_live(node)?;

        if self.links(node).child(!dir).is_none() {
            return Err(TreeError::MissingChild { node, dir: !dir });
        }

        Ok(self.rotate_small_at(node, dir))
    }

    /// Performs a double rotation at `node` turning in direction `dir`.
    ///
    /// The `dir` child of the `!dir` child of `node` (the high grandson) takes `node`'s place,
    /// adopting its former parent and `node` as children. Returns the high grandson.
    pub fn rotate_grand(&mut self, node: NodeId, dir: Dir) -> Result<NodeId, TreeError> {
        self.check_live(node)?;

        let Some(son) = self.links(node).child(!dir) else {
            return Err(TreeError::MissingChild { node, dir: !dir });
        };

        if self.links(son).child(dir).is_none() {
            return Err(TreeError::MissingChild { node: son, dir });
        }

        Ok(self.rotate_grand_at(node, dir))
    }

    // Moves the `!dir` child of `down` up into its place.
    fn rotate_small_at(&mut self, down: NodeId, dir: Dir) -> NodeId {
        // - `down` becomes the `dir` child of `up`.
        // - `across` goes from the `dir` child of `up` to the `!dir` child of `down`.
        let up = self
            .links(down)
            .child(!dir)
            .expect("small rotation requires a child to lift");
        let across = self.links(up).child(dir);
        let parent = self.links(down).parent;

        self.links_mut(down).set_child(!dir, across);
        self.maybe_set_parent(across, Some(down));

        self.links_mut(up).set_child(dir, Some(down));
        self.links_mut(down).set_parent(Some(up));

        self.links_mut(up).set_parent(parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        self.recompute(down);
        self.recompute(up);

        trace!(?down, ?up, ?dir, "small rotation");

        up
    }

    // Moves the `dir` child of the `!dir` child of `down` up into its place.
    fn rotate_grand_at(&mut self, down: NodeId, dir: Dir) -> NodeId {
        let son = self
            .links(down)
            .child(!dir)
            .expect("grand rotation requires a son");
        let up = self
            .links(son)
            .child(dir)
            .expect("grand rotation requires a high grandson");

        // The high grandson's children are split between `son` and `down`.
        let near = self.links(up).child(!dir);
        let far = self.links(up).child(dir);
        let parent = self.links(down).parent;

        self.links_mut(son).set_child(dir, near);
        self.maybe_set_parent(near, Some(son));

        self.links_mut(down).set_child(!dir, far);
        self.maybe_set_parent(far, Some(down));

        self.links_mut(up).set_child(!dir, Some(son));
        self.links_mut(son).set_parent(Some(up));

        self.links_mut(up).set_child(dir, Some(down));
        self.links_mut(down).set_parent(Some(up));

        self.links_mut(up).set_parent(parent);
        self.replace_child_or_set_root(parent, down, Some(up));

        self.recompute(son);
        self.recompute(down);
        self.recompute(up);

        trace!(?down, ?son, ?up, ?dir, "grand rotation");

        up
    }
}

//! A k-d tree over fixed-dimension points.

mod point;

use alloc::vec::Vec;
use core::fmt;

use tracing::{debug, trace};

pub use point::{Coordinate, Point};
use point::squared_distance;

use crate::raw::{BinaryTree, Linked, Side};
use crate::tree::{InsertOutcome, Removal, SearchTree};
use crate::{Error, NodeId, Result};

struct KdNode<T> {
    point: Point<T>,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<T> Linked for KdNode<T> {
    fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    fn left(&self) -> Option<NodeId> {
        self.left
    }

    fn right(&self) -> Option<NodeId> {
        self.right
    }

    fn set_parent(&mut self, id: Option<NodeId>) {
        self.parent = id;
    }

    fn set_left(&mut self, id: Option<NodeId>) {
        self.left = id;
    }

    fn set_right(&mut self, id: Option<NodeId>) {
        self.right = id;
    }
}

/// A binary space-partitioning tree over `k`-dimensional points.
///
/// A node at depth `d` splits on axis `d % k`: points whose coordinate on that
/// axis is strictly smaller go left, everything else goes right. The axis is
/// never stored; it follows from the depth.
///
/// Duplicate points are stored. Every operation checks that its points have
/// exactly `k` coordinates and fails with [`Error::DimensionMismatch`] before
/// touching the tree otherwise.
///
/// # Examples
///
/// ```
/// use search_forest::{KdTree, Point};
///
/// let mut tree: KdTree<i32> = KdTree::new();
/// for p in [[2, 3], [5, 4], [9, 6], [4, 7]] {
///     tree.insert(p)?;
/// }
///
/// let nearest = tree.nearest(&[9, 2])?.unwrap();
/// assert_eq!(tree.get(nearest), Some(&Point::from([9, 6])));
///
/// let mut hits: Vec<_> = tree
///     .range(&[3, 3], &[9, 7])?
///     .into_iter()
///     .filter_map(|id| tree.get(id))
///     .collect();
/// hits.sort_by_key(|p| (p[0], p[1]));
/// assert_eq!(hits, [&Point::from([4, 7]), &Point::from([5, 4]), &Point::from([9, 6])]);
/// # Ok::<(), search_forest::Error>(())
/// ```
pub struct KdTree<T> {
    tree: BinaryTree<KdNode<T>>,
    k: usize,
}

impl<T> KdTree<T> {
    /// Makes a new, empty two-dimensional `KdTree`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tree: BinaryTree::new(),
            k: 2,
        }
    }

    /// Makes a new, empty `KdTree` over `k`-dimensional points.
    ///
    /// # Errors
    ///
    /// [`Error::ZeroDimensions`] if `k` is zero.
    pub fn with_dimensions(k: usize) -> Result<Self> {
        if k == 0 {
            debug!("rejected zero-dimensional k-d tree");
            return Err(Error::ZeroDimensions);
        }
        Ok(Self {
            tree: BinaryTree::new(),
            k,
        })
    }

    /// Number of coordinates every point must have.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.k
    }

    /// Returns the number of points in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every point. The dimension count is kept.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Id of the root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root
    }

    /// Returns the point stored at `id`, or `None` if the id is stale.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Point<T>> {
        self.tree.nodes.try_get(id).map(|node| &node.point)
    }

    /// Returns a read-only view of the node at `id`.
    #[must_use]
    pub fn view(&self, id: NodeId) -> Option<KdView<'_, T>> {
        self.tree.nodes.try_get(id).map(|_| KdView { tree: self, id })
    }

    /// Returns a read-only view of the root.
    #[must_use]
    pub fn root_view(&self) -> Option<KdView<'_, T>> {
        self.tree.root.and_then(|id| self.view(id))
    }

    /// Returns every point, parents before their children.
    #[must_use]
    pub fn points(&self) -> Vec<&Point<T>> {
        self.tree.pre_order().into_iter().map(|id| &self.tree.nodes.get(id).point).collect()
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    fn check(&self, point: &[T]) -> Result<()> {
        if point.len() == self.k {
            Ok(())
        } else {
            debug!(expected = self.k, found = point.len(), "rejected point");
            Err(Error::DimensionMismatch {
                expected: self.k,
                found: point.len(),
            })
        }
    }

    fn point(&self, id: NodeId) -> &Point<T> {
        &self.tree.nodes.get(id).point
    }
}

impl<T: Coordinate> KdTree<T> {
    /// Inserts `point` as a new leaf. Duplicates are stored.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if `point` does not have
    /// [`dimensions`](Self::dimensions) coordinates.
    ///
    /// # Complexity
    ///
    /// O(depth of the tree)
    pub fn insert(&mut self, point: impl Into<Point<T>>) -> Result<InsertOutcome> {
        let point = point.into();
        self.check(&point)?;

        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.tree.root;
        let mut depth = 0;
        while let Some(id) = current {
            let axis = depth % self.k;
            side = if point[axis] < self.point(id)[axis] {
                Side::Left
            } else {
                Side::Right
            };
            parent = Some(id);
            current = self.tree.child(id, side);
            depth += 1;
        }

        let id = self.tree.nodes.alloc(KdNode {
            point,
            parent: None,
            left: None,
            right: None,
        });
        match parent {
            Some(parent) => self.tree.set_child(parent, side, Some(id)),
            None => self.tree.root = Some(id),
        }
        trace!(?id, depth, "inserted");
        Ok(InsertOutcome::Inserted)
    }

    /// Returns the id and depth of the first node equal to `point` on the
    /// descent path.
    fn locate(&self, point: &[T]) -> Option<(NodeId, usize)> {
        let mut current = self.tree.root;
        let mut depth = 0;
        while let Some(id) = current {
            let here = self.point(id);
            if here.as_slice() == point {
                return Some((id, depth));
            }
            let axis = depth % self.k;
            current = if point[axis] < here[axis] {
                self.tree.left(id)
            } else {
                self.tree.right(id)
            };
            depth += 1;
        }
        None
    }

    /// Returns the id of a node holding exactly `point`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] on a point of the wrong length.
    pub fn search(&self, point: &[T]) -> Result<Option<NodeId>> {
        self.check(point)?;
        Ok(self.locate(point).map(|(id, _)| id))
    }

    /// Returns the id of the stored point closest to `target`, by Euclidean
    /// distance. When several points are equally close, the first one reached
    /// wins.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] on a point of the wrong length.
    ///
    /// # Complexity
    ///
    /// O(log n) for well-spread points, O(n) in the worst case.
    pub fn nearest(&self, target: &[T]) -> Result<Option<NodeId>> {
        self.check(target)?;
        let mut best = None;
        self.nearest_in(self.tree.root, 0, target, &mut best);
        Ok(best.map(|(id, _)| id))
    }

    fn nearest_in(&self, id: Option<NodeId>, depth: usize, target: &[T], best: &mut Option<(NodeId, T::Distance)>) {
        let Some(id) = id else { return };
        let here = self.point(id);
        let distance = squared_distance(here, target);
        if best.is_none_or(|(_, closest)| distance < closest) {
            *best = Some((id, distance));
        }

        let axis = depth % self.k;
        let (near, far) = if target[axis] < here[axis] {
            (self.tree.left(id), self.tree.right(id))
        } else {
            (self.tree.right(id), self.tree.left(id))
        };
        self.nearest_in(near, depth + 1, target, best);

        // The far side can only help if the splitting plane is closer than the best.
        let plane = target[axis].squared_gap(here[axis]);
        if best.is_none_or(|(_, closest)| plane < closest) {
            self.nearest_in(far, depth + 1, target, best);
        } else {
            trace!(?id, "pruned far side");
        }
    }

    /// Returns every node inside the box `min..=max`, in pre-order.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if either corner has the wrong length.
    pub fn range(&self, min: &[T], max: &[T]) -> Result<Vec<NodeId>> {
        self.check(min)?;
        self.check(max)?;

        let mut found = Vec::new();
        let mut stack: Vec<(NodeId, usize)> = self.tree.root.map(|root| (root, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            let here = self.point(id);
            let inside = here.iter().zip(min.iter().zip(max)).all(|(c, (lo, hi))| lo <= c && c <= hi);
            if inside {
                found.push(id);
            }

            let axis = depth % self.k;
            if max[axis] >= here[axis] {
                stack.extend(self.tree.right(id).map(|right| (right, depth + 1)));
            }
            if min[axis] <= here[axis] {
                stack.extend(self.tree.left(id).map(|left| (left, depth + 1)));
            }
        }
        Ok(found)
    }

    /// Removes one node holding exactly `point`.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] on a point of the wrong length.
    pub fn delete(&mut self, point: &[T]) -> Result<Removal> {
        self.check(point)?;
        let Some((id, depth)) = self.locate(point) else {
            return Ok(Removal::NotFound);
        };
        self.remove_node(id, depth);
        Ok(Removal::Removed)
    }

    /// Removes the node at `id`, which sits at `depth`, by pulling up a
    /// replacement that keeps every split valid.
    fn remove_node(&mut self, id: NodeId, depth: usize) {
        let axis = depth % self.k;
        let replacement = if let Some(right) = self.tree.right(id) {
            self.axis_minimum(right, depth + 1, axis)
        } else if let Some(left) = self.tree.left(id) {
            // Everything left of `id` is at least the minimum, so after the copy
            // the whole subtree belongs on the right.
            let found = self.axis_minimum(left, depth + 1, axis);
            self.tree.set_child(id, Side::Left, None);
            self.tree.set_child(id, Side::Right, Some(left));
            found
        } else {
            trace!(?id, "removing leaf");
            if self.tree.root == Some(id) {
                debug!("k-d tree emptied");
            }
            self.tree.transplant(id, None);
            self.tree.nodes.free(id);
            return;
        };

        let (source, source_depth) = replacement;
        trace!(?id, ?source, axis, "replacing with axis minimum");
        let point = self.point(source).clone();
        self.tree.nodes.get_mut(id).point = point;
        self.remove_node(source, source_depth);
    }

    /// Node with the smallest coordinate on `axis` under `id`, and its depth.
    /// Ties go to the node found first.
    fn axis_minimum(&self, id: NodeId, depth: usize, axis: usize) -> (NodeId, usize) {
        let mut best = (id, depth);
        let left = self.tree.left(id).map(|left| self.axis_minimum(left, depth + 1, axis));
        // Below a node split on `axis`, the right side cannot hold anything smaller.
        let right = if depth % self.k == axis {
            None
        } else {
            self.tree.right(id).map(|right| self.axis_minimum(right, depth + 1, axis))
        };
        for candidate in left.into_iter().chain(right) {
            if self.point(candidate.0)[axis] < self.point(best.0)[axis] {
                best = candidate;
            }
        }
        best
    }
}

/// Read-only view of one k-d node.
pub struct KdView<'a, T> {
    tree: &'a KdTree<T>,
    id: NodeId,
}

impl<T> Clone for KdView<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for KdView<'_, T> {}

impl<'a, T> KdView<'a, T> {
    fn at(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| KdView { tree: self.tree, id })
    }

    /// Id of the viewed node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The stored point.
    #[must_use]
    pub fn point(&self) -> &'a Point<T> {
        self.tree.point(self.id)
    }

    /// Distance from the root; the root is at depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.tree.tree.depth(self.id)
    }

    /// The axis this node splits on.
    #[must_use]
    pub fn axis(&self) -> usize {
        self.depth() % self.tree.k
    }

    /// Subtree of points below this one on [`axis`](Self::axis).
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.at(self.tree.tree.left(self.id))
    }

    /// Subtree of points at or above this one on [`axis`](Self::axis).
    #[must_use]
    pub fn right(&self) -> Option<Self> {
        self.at(self.tree.tree.right(self.id))
    }

    /// Parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.at(self.tree.tree.parent(self.id))
    }
}

impl<T: fmt::Debug> fmt::Debug for KdView<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdView")
            .field("point", self.point())
            .field("axis", &self.axis())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<T: Coordinate> SearchTree for KdTree<T> {
    type Key = Point<T>;
    type View<'a>
        = KdView<'a, T>
    where
        Self: 'a;

    fn insert(&mut self, key: Point<T>) -> Result<InsertOutcome> {
        KdTree::insert(self, key)
    }

    fn search(&mut self, key: &Point<T>) -> Result<Option<NodeId>> {
        KdTree::search(self, key)
    }

    fn delete(&mut self, key: &Point<T>) -> Result<Removal> {
        KdTree::delete(self, key)
    }

    fn root(&self) -> Option<NodeId> {
        self.tree.root
    }

    fn view(&self, id: NodeId) -> Option<KdView<'_, T>> {
        KdTree::view(self, id)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn clear(&mut self) {
        KdTree::clear(self);
    }
}

impl<T: fmt::Debug> fmt::Debug for KdTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KdTree")
            .field("k", &self.k)
            .field("points", &self.points())
            .finish()
    }
}

impl<T> Default for KdTree<T> {
    fn default() -> Self {
        KdTree::new()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn sample() -> KdTree<i32> {
        let mut tree: KdTree<i32> = KdTree::new();
        for p in [[5, 5], [3, 8], [8, 2], [1, 9], [4, 1], [7, 7], [9, 9]] {
            tree.insert(p).unwrap();
        }
        tree
    }

    /// Checks the split invariant and parent links of every node.
    fn check(tree: &KdTree<i32>) {
        fn walk(tree: &KdTree<i32>, id: Option<NodeId>, parent: Option<NodeId>, depth: usize, bounds: &mut Vec<(usize, i32, Side)>) -> usize {
            let Some(id) = id else { return 0 };
            assert_eq!(tree.tree.parent(id), parent);
            let point = tree.point(id);
            for &(axis, split, side) in bounds.iter() {
                match side {
                    Side::Left => assert!(point[axis] < split, "{point:?} left of {split} on {axis}"),
                    Side::Right => assert!(point[axis] >= split, "{point:?} right of {split} on {axis}"),
                }
            }
            let axis = depth % tree.k;
            bounds.push((axis, point[axis], Side::Left));
            let left = walk(tree, tree.tree.left(id), Some(id), depth + 1, bounds);
            bounds.pop();
            bounds.push((axis, point[axis], Side::Right));
            let right = walk(tree, tree.tree.right(id), Some(id), depth + 1, bounds);
            bounds.pop();
            1 + left + right
        }
        let count = walk(tree, tree.tree.root, None, 0, &mut Vec::new());
        assert_eq!(count, tree.len());
    }

    #[test]
    fn axes_alternate_with_depth() {
        let tree = sample();
        check(&tree);
        let root = tree.root_view().unwrap();
        assert_eq!(root.axis(), 0);
        let left = root.left().unwrap();
        assert_eq!(left.point(), &Point::from([3, 8]));
        assert_eq!((left.depth(), left.axis()), (1, 1));
        assert_eq!(left.left().unwrap().point(), &Point::from([4, 1]));
    }

    #[test]
    fn delete_root_pulls_axis_minimum_from_right() {
        let mut tree = sample();
        assert_eq!(tree.delete(&[5, 5]).unwrap(), Removal::Removed);
        check(&tree);
        // Smallest x on the right of the root is (7, 7).
        assert_eq!(tree.root_view().unwrap().point(), &Point::from([7, 7]));
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn delete_with_only_left_subtree_moves_it_right() {
        let mut tree: KdTree<i32> = KdTree::new();
        for p in [[5, 5], [3, 3], [2, 6], [4, 1]] {
            tree.insert(p).unwrap();
        }
        tree.delete(&[5, 5]).unwrap();
        check(&tree);
        let root = tree.root_view().unwrap();
        assert_eq!(root.point(), &Point::from([2, 6]));
        assert!(root.left().is_none());
        assert_eq!(root.right().unwrap().point(), &Point::from([3, 3]));
    }

    #[test]
    fn duplicates_delete_one_at_a_time() {
        let mut tree: KdTree<i32> = KdTree::new();
        for _ in 0..3 {
            tree.insert([1, 1]).unwrap();
        }
        tree.insert([0, 4]).unwrap();
        for remaining in [3, 2, 1] {
            assert_eq!(tree.delete(&[1, 1]).unwrap(), Removal::Removed);
            assert_eq!(tree.len(), remaining);
            check(&tree);
        }
        assert_eq!(tree.delete(&[1, 1]).unwrap(), Removal::NotFound);
        assert_eq!(tree.points(), [&Point::from([0, 4])]);
    }

    #[test]
    fn rejected_points_leave_the_tree_alone() {
        let mut tree = sample();
        let before: Vec<_> = tree.points().into_iter().cloned().collect();
        assert_eq!(
            tree.insert([1, 2, 3]),
            Err(Error::DimensionMismatch { expected: 2, found: 3 })
        );
        assert!(tree.delete(&[5]).is_err());
        assert!(tree.range(&[0, 0], &[1]).is_err());
        let after: Vec<_> = tree.points().into_iter().cloned().collect();
        assert_eq!(before, after);
        assert!(matches!(KdTree::<i32>::with_dimensions(0), Err(Error::ZeroDimensions)));
    }

    #[test]
    fn nearest_tie_keeps_first_found() {
        let mut tree: KdTree<i32> = KdTree::new();
        tree.insert([0, 0]).unwrap();
        tree.insert([2, 0]).unwrap();
        let nearest = tree.nearest(&[1, 0]).unwrap().unwrap();
        assert_eq!(Some(nearest), tree.root());
        assert_eq!(KdTree::<i32>::new().nearest(&[1, 0]).unwrap(), None);
    }
}

//! A red-black tree over unique, totally ordered keys.

mod node;

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};
use core::fmt;

use tracing::{debug, trace};

pub use node::Color;
use node::RbNode;

use crate::raw::{BinaryTree, Side};
use crate::tree::{InsertOutcome, Removal, SearchTree};
use crate::{NodeId, Result};

/// A binary search tree that keeps itself balanced with a color bit per node.
///
/// After every operation the root is black, no red node has a red child, and
/// every root-to-leaf path crosses the same number of black nodes, which bounds
/// the height by `2 * log2(n + 1)`.
///
/// Keys are unique: inserting a key that is already present changes nothing and
/// reports [`InsertOutcome::Duplicate`].
///
/// Deleting a key whose node has two children copies the in-order successor's key
/// into that node and frees the successor's node instead, so a [`NodeId`] obtained
/// before a delete may afterwards name a node holding a different key, or nothing.
/// Re-run [`search`](Self::search) after mutating.
///
/// # Examples
///
/// ```
/// use search_forest::{Color, RedBlackTree};
///
/// let mut tree = RedBlackTree::new();
/// for key in [10, 20, 30] {
///     tree.insert(key);
/// }
///
/// let root = tree.root_view().unwrap();
/// assert_eq!(*root.key(), 20);
/// assert_eq!(root.color(), Color::Black);
/// assert_eq!(root.left().map(|n| n.color()), Some(Color::Red));
/// assert_eq!(root.right().map(|n| n.color()), Some(Color::Red));
/// ```
pub struct RedBlackTree<K> {
    tree: BinaryTree<RbNode<K>>,
}

impl<K> RedBlackTree<K> {
    /// Makes a new, empty `RedBlackTree`.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tree: BinaryTree::new(),
        }
    }

    /// Returns the number of keys in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key. Previously issued ids go stale.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Id of the root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.tree.root
    }

    /// Returns the key stored at `id`, or `None` if the id is stale.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&K> {
        self.tree.nodes.try_get(id).map(|node| &node.key)
    }

    /// Returns a read-only view of the node at `id`.
    #[must_use]
    pub fn view(&self, id: NodeId) -> Option<RbView<'_, K>> {
        self.tree.nodes.try_get(id).map(|_| RbView { tree: self, id })
    }

    /// Returns a read-only view of the root.
    #[must_use]
    pub fn root_view(&self) -> Option<RbView<'_, K>> {
        self.tree.root.and_then(|id| self.view(id))
    }

    /// Returns the keys in ascending order.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::RedBlackTree;
    ///
    /// let tree: RedBlackTree<_> = [3, 1, 2].into_iter().collect();
    /// assert_eq!(tree.keys(), [&1, &2, &3]);
    /// ```
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.tree.in_order().into_iter().map(|id| &self.tree.nodes.get(id).key).collect()
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Absent children count as black.
    fn color(&self, id: Option<NodeId>) -> Color {
        id.map_or(Color::Black, |id| self.tree.nodes.get(id).color)
    }

    fn is_red(&self, id: Option<NodeId>) -> bool {
        self.color(id) == Color::Red
    }

    fn set_color(&mut self, id: NodeId, color: Color) {
        self.tree.nodes.get_mut(id).color = color;
    }

    fn sibling(&self, parent: NodeId, side: Side) -> NodeId {
        self.tree
            .child(parent, side.opposite())
            .expect("`RedBlackTree::sibling()` - black height violated, no sibling!")
    }
}

impl<K: Ord> RedBlackTree<K> {
    /// Inserts `key`, rebalancing as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::{InsertOutcome, RedBlackTree};
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert_eq!(tree.insert(5), InsertOutcome::Inserted);
    /// assert_eq!(tree.insert(5), InsertOutcome::Duplicate);
    /// assert_eq!(tree.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K) -> InsertOutcome {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.tree.root;
        while let Some(id) = current {
            side = match key.cmp(&self.tree.nodes.get(id).key) {
                Less => Side::Left,
                Greater => Side::Right,
                Equal => return InsertOutcome::Duplicate,
            };
            parent = Some(id);
            current = self.tree.child(id, side);
        }

        let id = self.tree.nodes.alloc(RbNode::new(key));
        match parent {
            Some(parent) => self.tree.set_child(parent, side, Some(id)),
            None => self.tree.root = Some(id),
        }
        self.insert_fixup(id);
        InsertOutcome::Inserted
    }

    /// Restores the red-black properties after `node` was attached as a red leaf.
    fn insert_fixup(&mut self, mut node: NodeId) {
        while let Some(mut parent) = self.tree.parent(node) {
            if !self.is_red(Some(parent)) {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(grand) = self.tree.parent(parent) else { break };
            let parent_side = if self.tree.left(grand) == Some(parent) {
                Side::Left
            } else {
                Side::Right
            };

            if let Some(uncle) = self.tree.child(grand, parent_side.opposite()).filter(|&u| self.is_red(Some(u))) {
                trace!(?grand, "red uncle, recoloring");
                self.set_color(parent, Color::Black);
                self.set_color(uncle, Color::Black);
                self.set_color(grand, Color::Red);
                node = grand;
                continue;
            }

            if self.tree.child(parent, parent_side.opposite()) == Some(node) {
                trace!(?parent, "straightening triangle");
                self.tree.rotate(parent, parent_side);
                core::mem::swap(&mut node, &mut parent);
            }
            trace!(?grand, "rotating grandparent");
            self.set_color(parent, Color::Black);
            self.set_color(grand, Color::Red);
            self.tree.rotate(grand, parent_side.opposite());
        }

        if let Some(root) = self.tree.root {
            self.set_color(root, Color::Black);
        }
    }

    /// Returns the id of the node holding `key`. Never restructures the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::RedBlackTree;
    ///
    /// let tree: RedBlackTree<_> = [1, 2, 3].into_iter().collect();
    /// let id = tree.search(&2).unwrap();
    /// assert_eq!(tree.get(id), Some(&2));
    /// assert!(tree.search(&4).is_none());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn search<Q>(&self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut current = self.tree.root;
        while let Some(id) = current {
            current = match key.cmp(self.tree.nodes.get(id).key.borrow()) {
                Less => self.tree.left(id),
                Greater => self.tree.right(id),
                Equal => return Some(id),
            };
        }
        None
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Removes `key`, rebalancing as needed.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::{Removal, RedBlackTree};
    ///
    /// let mut tree: RedBlackTree<_> = [1, 2, 3].into_iter().collect();
    /// assert_eq!(tree.delete(&1), Removal::Removed);
    /// assert_eq!(tree.delete(&1), Removal::NotFound);
    /// assert_eq!(tree.keys(), [&2, &3]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn delete<Q>(&mut self, key: &Q) -> Removal
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(target) = RedBlackTree::search(self, key) else {
            return Removal::NotFound;
        };

        // `child` takes the place of the node physically removed; `parent` is
        // where it hangs, which still locates the hole when `child` is `None`.
        let (child, parent, removed_color) = match (self.tree.left(target), self.tree.right(target)) {
            (Some(_), Some(right)) => {
                let successor = self.tree.minimum(right);
                let child = self.tree.right(successor);
                let parent = self.tree.parent(successor);
                let color = self.tree.nodes.get(successor).color;
                self.tree.transplant(successor, child);
                let successor = self.tree.nodes.take(successor);
                self.tree.nodes.get_mut(target).key = successor.key;
                (child, parent, color)
            }
            (left, right) => {
                let child = left.or(right);
                let parent = self.tree.parent(target);
                let color = self.tree.nodes.get(target).color;
                self.tree.transplant(target, child);
                self.tree.nodes.free(target);
                (child, parent, color)
            }
        };

        if removed_color == Color::Black {
            if child.is_none() {
                debug!(?parent, "removed a black leaf, fixing up from the hole");
            }
            self.delete_fixup(child, parent);
        }
        Removal::Removed
    }

    /// Resolves the missing black on the path through `node`, which hangs from
    /// `parent`. `node` may be `None` when a black leaf was removed.
    fn delete_fixup(&mut self, mut node: Option<NodeId>, mut parent: Option<NodeId>) {
        while node != self.tree.root && !self.is_red(node) {
            let Some(p) = parent else { break };
            let side = if self.tree.left(p) == node { Side::Left } else { Side::Right };
            let far = side.opposite();
            let mut sibling = self.sibling(p, side);

            if self.is_red(Some(sibling)) {
                trace!(?p, "red sibling, rotating parent");
                self.set_color(sibling, Color::Black);
                self.set_color(p, Color::Red);
                self.tree.rotate(p, side);
                sibling = self.sibling(p, side);
            }

            let near_child = self.tree.child(sibling, side);
            let far_child = self.tree.child(sibling, far);
            if !self.is_red(near_child) && !self.is_red(far_child) {
                trace!(?p, "black sibling with black children, moving up");
                self.set_color(sibling, Color::Red);
                node = Some(p);
                parent = self.tree.parent(p);
                continue;
            }

            if !self.is_red(far_child) {
                // The near child is red; turn it into the far child.
                trace!(?sibling, "rotating sibling");
                if let Some(near_child) = near_child {
                    self.set_color(near_child, Color::Black);
                }
                self.set_color(sibling, Color::Red);
                self.tree.rotate(sibling, far);
                sibling = self.sibling(p, side);
            }

            trace!(?p, "red far nephew, rotating parent");
            let parent_color = self.tree.nodes.get(p).color;
            self.set_color(sibling, parent_color);
            self.set_color(p, Color::Black);
            if let Some(far_child) = self.tree.child(sibling, far) {
                self.set_color(far_child, Color::Black);
            }
            self.tree.rotate(p, side);
            node = self.tree.root;
            parent = None;
        }

        if let Some(node) = node {
            self.set_color(node, Color::Black);
        }
    }
}

/// Read-only view of one red-black node.
pub struct RbView<'a, K> {
    tree: &'a RedBlackTree<K>,
    id: NodeId,
}

impl<K> Clone for RbView<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for RbView<'_, K> {}

impl<'a, K> RbView<'a, K> {
    fn node(&self) -> &'a RbNode<K> {
        self.tree.tree.nodes.get(self.id)
    }

    fn at(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| RbView { tree: self.tree, id })
    }

    /// Id of the viewed node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's key.
    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.node().key
    }

    /// The node's color.
    #[must_use]
    pub fn color(&self) -> Color {
        self.node().color
    }

    /// Left child.
    #[must_use]
    pub fn left(&self) -> Option<Self> {
        self.at(self.tree.tree.left(self.id))
    }

    /// Right child.
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

impl<K: fmt::Debug> fmt::Debug for RbView<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RbView")
            .field("key", self.key())
            .field("color", &self.color())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<K: Ord> SearchTree for RedBlackTree<K> {
    type Key = K;
    type View<'a>
        = RbView<'a, K>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> Result<InsertOutcome> {
        Ok(RedBlackTree::insert(self, key))
    }

    fn search(&mut self, key: &K) -> Result<Option<NodeId>> {
        Ok(RedBlackTree::search(self, key))
    }

    fn delete(&mut self, key: &K) -> Result<Removal> {
        Ok(RedBlackTree::delete(self, key))
    }

    fn root(&self) -> Option<NodeId> {
        self.tree.root
    }

    fn view(&self, id: NodeId) -> Option<RbView<'_, K>> {
        RedBlackTree::view(self, id)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K: fmt::Debug> fmt::Debug for RedBlackTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<K> Default for RedBlackTree<K> {
    fn default() -> Self {
        RedBlackTree::new()
    }
}

impl<K: Ord> FromIterator<K> for RedBlackTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = RedBlackTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for RedBlackTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    /// Returns the black height, panicking on any red-black violation.
    fn check(tree: &RedBlackTree<i32>) -> usize {
        fn walk(tree: &RedBlackTree<i32>, id: Option<NodeId>, parent: Option<NodeId>) -> usize {
            let Some(id) = id else { return 1 };
            assert_eq!(tree.tree.parent(id), parent, "parent link of {id:?}");
            let node = tree.tree.nodes.get(id);
            if node.color == Color::Red {
                assert!(!tree.is_red(tree.tree.left(id)), "red-red at {}", node.key);
                assert!(!tree.is_red(tree.tree.right(id)), "red-red at {}", node.key);
            }
            let left = walk(tree, tree.tree.left(id), Some(id));
            let right = walk(tree, tree.tree.right(id), Some(id));
            assert_eq!(left, right, "black height differs under {}", node.key);
            left + usize::from(node.color == Color::Black)
        }

        assert!(!tree.is_red(tree.tree.root));
        let keys = tree.keys();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
        walk(tree, tree.tree.root, None)
    }

    #[test]
    fn ascending_inserts_rotate() {
        let tree: RedBlackTree<i32> = (1..=3).collect();
        let root = tree.root_view().unwrap();
        assert_eq!(*root.key(), 2);
        assert_eq!(root.color(), Color::Black);
        assert_eq!(root.parent().map(|p| *p.key()), None);
        check(&tree);
    }

    #[test]
    fn zig_zag_insert_straightens() {
        let tree: RedBlackTree<i32> = [30, 10, 20].into_iter().collect();
        let root = tree.root_view().unwrap();
        assert_eq!(*root.key(), 20);
        assert_eq!(root.left().map(|n| (*n.key(), n.color())), Some((10, Color::Red)));
        assert_eq!(root.right().map(|n| (*n.key(), n.color())), Some((30, Color::Red)));
    }

    #[test]
    fn deleting_black_leaf_runs_fixup() {
        // 20B(10B, 30B(25R, 40R)) after the recolor on 40.
        let mut tree: RedBlackTree<i32> = [20, 10, 30, 25, 40].into_iter().collect();
        let leaf = tree.search(&10).unwrap();
        assert_eq!(tree.view(leaf).unwrap().color(), Color::Black);
        assert!(tree.view(leaf).unwrap().left().is_none());

        assert_eq!(tree.delete(&10), Removal::Removed);
        check(&tree);
        assert_eq!(tree.keys(), [&20, &25, &30, &40]);
        assert_eq!(tree.get(leaf), None);
    }

    #[test]
    fn successor_copy_keeps_surviving_id() {
        let mut tree: RedBlackTree<i32> = (1..=7).collect();
        let root = tree.root().unwrap();
        let old = *tree.get(root).unwrap();
        tree.delete(&old);
        check(&tree);
        // The root slot survives and now carries the successor's key.
        assert_eq!(tree.get(root), Some(&(old + 1)));
    }

    #[test]
    fn drain_everything() {
        let mut tree: RedBlackTree<i32> = (0..64).map(|k| (k * 37) % 64).collect();
        check(&tree);
        for k in 0..64 {
            assert_eq!(tree.delete(&k), Removal::Removed);
            check(&tree);
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }
}

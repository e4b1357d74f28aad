//! A 2-3-4 tree: a B-tree of order 4.

mod node;

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;

use tracing::{debug, trace};

use node::{Children, Node234};

use crate::raw::Arena;
use crate::tree::{InsertOutcome, Removal, SearchTree};
use crate::{NodeId, Result};

/// A B-tree whose nodes hold one to three keys.
///
/// Inserts split full nodes on the way down, so a key always lands in a leaf
/// with room for it. Deletes borrow from or merge with siblings on the way
/// back up, so no node other than a collapsing root is ever left without a
/// key. All leaves sit at the same depth.
///
/// Unlike the binary engines, a `Tree234` stores duplicate keys: inserting a key
/// that is already present adds a second occurrence, and each delete removes
/// one occurrence.
///
/// # Examples
///
/// ```
/// use search_forest::Tree234;
///
/// let tree: Tree234<_> = [10, 20, 30, 40].into_iter().collect();
///
/// let root = tree.root_view().unwrap();
/// assert_eq!(root.keys(), [20]);
/// let children: Vec<_> = root.children().map(|c| c.keys().to_vec()).collect();
/// assert_eq!(children, [vec![10], vec![30, 40]]);
/// ```
pub struct Tree234<K> {
    nodes: Arena<Node234<K>>,
    root: Option<NodeId>,
    len: usize,
}

impl<K> Tree234<K> {
    /// Makes a new, empty `Tree234`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    /// Returns the number of keys in the tree, counting duplicates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree contains no keys.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    /// Id of the root node, if any.
    #[must_use]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the tree (not keys).
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the keys held by the node at `id`, or `None` if the id is stale.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&[K]> {
        self.nodes.try_get(id).map(|node| node.keys.as_slice())
    }

    /// Returns a read-only view of the node at `id`.
    #[must_use]
    pub fn view(&self, id: NodeId) -> Option<Node234View<'_, K>> {
        self.nodes.try_get(id).map(|_| Node234View { tree: self, id })
    }

    /// Returns a read-only view of the root.
    #[must_use]
    pub fn root_view(&self) -> Option<Node234View<'_, K>> {
        self.root.and_then(|id| self.view(id))
    }

    /// Number of levels. Every leaf is at this depth.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(id) = current {
            height += 1;
            current = self.nodes.get(id).children.first().copied();
        }
        height
    }

    /// Returns every key in non-decreasing order, duplicates included.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::Tree234;
    ///
    /// let tree: Tree234<_> = [2, 1, 2, 3].into_iter().collect();
    /// assert_eq!(tree.keys(), [&1, &2, &2, &3]);
    /// ```
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            self.collect_keys(root, &mut out);
        }
        out
    }

    fn collect_keys<'a>(&'a self, id: NodeId, out: &mut Vec<&'a K>) {
        let node = self.nodes.get(id);
        if node.is_leaf() {
            out.extend(node.keys.iter());
            return;
        }
        for (key, &child) in node.keys.iter().zip(&node.children) {
            self.collect_keys(child, out);
            out.push(key);
        }
        if let Some(&last) = node.children.last() {
            self.collect_keys(last, out);
        }
    }

    /// Largest key in the subtree under `id`.
    fn max_key(&self, mut id: NodeId) -> &K {
        loop {
            let node = self.nodes.get(id);
            match node.children.last() {
                Some(&last) => id = last,
                None => return node.keys.last().expect("`Tree234::max_key()` - leaf has no keys!"),
            }
        }
    }

    /// Splits the full child at `index` of `parent`; its middle key moves up.
    fn split_child(&mut self, parent: NodeId, index: usize) {
        let child = self.nodes.get(parent).children[index];
        let full = self.nodes.get_mut(child);
        let right_key = full.keys.pop().expect("`Tree234::split_child()` - child is not full!");
        let middle = full.keys.pop().expect("`Tree234::split_child()` - child is not full!");
        let right_children: Children = if full.is_leaf() {
            Children::new()
        } else {
            full.children.drain(2..).collect()
        };

        let mut sibling = Node234::leaf(right_key, Some(parent));
        sibling.children = right_children.clone();
        let sibling = self.nodes.alloc(sibling);
        for grandchild in right_children {
            self.nodes.get_mut(grandchild).parent = Some(sibling);
        }

        let parent_node = self.nodes.get_mut(parent);
        parent_node.keys.insert(index, middle);
        parent_node.children.insert(index + 1, sibling);
        trace!(?child, ?sibling, "split");
    }

    /// Ensures `parent.children[index]` holds a key after a delete below it.
    fn fix_child(&mut self, parent: NodeId, index: usize) {
        let node = self.nodes.get(parent);
        let child = node.children[index];
        if !self.nodes.get(child).keys.is_empty() {
            return;
        }
        let left = index.checked_sub(1).map(|i| node.children[i]);
        let right = node.children.get(index + 1).copied();

        if let Some(left) = left.filter(|&left| self.nodes.get(left).can_lend()) {
            self.borrow_from_left(parent, index, left, child);
        } else if let Some(right) = right.filter(|&right| self.nodes.get(right).can_lend()) {
            self.borrow_from_right(parent, index, child, right);
        } else if left.is_some() {
            self.merge(parent, index - 1);
        } else {
            self.merge(parent, index);
        }
    }

    /// Rotates a key from the left sibling through the parent into `child`.
    fn borrow_from_left(&mut self, parent: NodeId, index: usize, left: NodeId, child: NodeId) {
        trace!(?child, ?left, "borrow from left");
        let lent = self.nodes.get_mut(left).keys.pop().expect("`Tree234::borrow_from_left()` - sibling is empty!");
        let separator = core::mem::replace(&mut self.nodes.get_mut(parent).keys[index - 1], lent);
        self.nodes.get_mut(child).keys.insert(0, separator);
        if let Some(moved) = self.nodes.get_mut(left).children.pop() {
            self.nodes.get_mut(child).children.insert(0, moved);
            self.nodes.get_mut(moved).parent = Some(child);
        }
    }

    /// Rotates a key from the right sibling through the parent into `child`.
    fn borrow_from_right(&mut self, parent: NodeId, index: usize, child: NodeId, right: NodeId) {
        trace!(?child, ?right, "borrow from right");
        let sibling = self.nodes.get_mut(right);
        let lent = sibling.keys.remove(0);
        let moved = (!sibling.is_leaf()).then(|| sibling.children.remove(0));
        let separator = core::mem::replace(&mut self.nodes.get_mut(parent).keys[index], lent);
        self.nodes.get_mut(child).keys.push(separator);
        if let Some(moved) = moved {
            self.nodes.get_mut(child).children.push(moved);
            self.nodes.get_mut(moved).parent = Some(child);
        }
    }

    /// Folds `children[index + 1]` and the key between them into `children[index]`.
    fn merge(&mut self, parent: NodeId, index: usize) {
        let parent_node = self.nodes.get_mut(parent);
        let separator = parent_node.keys.remove(index);
        let right = parent_node.children.remove(index + 1);
        let left = parent_node.children[index];
        trace!(?left, ?right, "merge");

        let absorbed = self.nodes.take(right);
        for &grandchild in &absorbed.children {
            self.nodes.get_mut(grandchild).parent = Some(left);
        }
        let left_node = self.nodes.get_mut(left);
        left_node.keys.push(separator);
        left_node.keys.extend(absorbed.keys);
        left_node.children.extend(absorbed.children);
    }
}

impl<K: Ord + Clone> Tree234<K> {
    /// Inserts `key`, splitting full nodes on the way down.
    ///
    /// Always reports [`InsertOutcome::Inserted`]: duplicates are stored.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn insert(&mut self, key: K) -> InsertOutcome {
        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(Node234::leaf(key, None)));
            self.len = 1;
            return InsertOutcome::Inserted;
        };

        let mut current = root;
        if self.nodes.get(root).is_full() {
            let new_root = self.nodes.alloc(Node234::above(root));
            self.nodes.get_mut(root).parent = Some(new_root);
            self.split_child(new_root, 0);
            self.root = Some(new_root);
            current = new_root;
            debug!(height = self.height(), "root split");
        }

        loop {
            let node = self.nodes.get(current);
            let mut index = node.upper_bound(&key);
            if node.is_leaf() {
                self.nodes.get_mut(current).keys.insert(index, key);
                break;
            }
            if self.nodes.get(node.children[index]).is_full() {
                self.split_child(current, index);
                if key > self.nodes.get(current).keys[index] {
                    index += 1;
                }
            }
            current = self.nodes.get(current).children[index];
        }
        self.len += 1;
        InsertOutcome::Inserted
    }

    /// Returns the id of a node holding `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::Tree234;
    ///
    /// let tree: Tree234<_> = (1..=10).collect();
    /// let id = tree.search(&7).unwrap();
    /// assert!(tree.get(id).unwrap().contains(&7));
    /// assert!(tree.search(&11).is_none());
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
        let mut current = self.root?;
        loop {
            let node = self.nodes.get(current);
            let index = node.lower_bound(key);
            if node.keys.get(index).is_some_and(|k| k.borrow() == key) {
                return Some(current);
            }
            if node.is_leaf() {
                return None;
            }
            current = node.children[index];
        }
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.search(key).is_some()
    }

    /// Removes one occurrence of `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::{Removal, Tree234};
    ///
    /// let mut tree: Tree234<_> = [5, 5, 6].into_iter().collect();
    /// assert_eq!(tree.delete(&5), Removal::Removed);
    /// assert_eq!(tree.keys(), [&5, &6]);
    /// assert_eq!(tree.delete(&7), Removal::NotFound);
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
        let Some(root) = self.root else {
            return Removal::NotFound;
        };
        if !self.delete_from(root, key) {
            return Removal::NotFound;
        }
        self.len -= 1;

        let node = self.nodes.get(root);
        if node.keys.is_empty() {
            let new_root = node.children.first().copied();
            self.nodes.free(root);
            if let Some(new_root) = new_root {
                self.nodes.get_mut(new_root).parent = None;
            }
            self.root = new_root;
            debug!(?new_root, "root collapsed");
        }
        Removal::Removed
    }

    /// Deletes `key` from the subtree under `id`, repairing children on the way
    /// back up. `id` itself may be left keyless for its parent to repair.
    fn delete_from<Q>(&mut self, id: NodeId, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let node = self.nodes.get(id);
        let index = node.lower_bound(key);
        let hit = node.keys.get(index).is_some_and(|k| k.borrow() == key);

        if node.is_leaf() {
            if hit {
                self.nodes.get_mut(id).keys.remove(index);
            }
            return hit;
        }

        let child = node.children[index];
        if hit {
            // Replace with the predecessor, then remove the predecessor below.
            let predecessor = self.max_key(child).clone();
            let removed = self.delete_from::<K>(child, &predecessor);
            debug_assert!(removed, "predecessor vanished from its own subtree");
            self.nodes.get_mut(id).keys[index] = predecessor;
            self.fix_child(id, index);
            return true;
        }

        let removed = self.delete_from(child, key);
        if removed {
            self.fix_child(id, index);
        }
        removed
    }
}

/// Read-only view of one 2-3-4 node.
pub struct Node234View<'a, K> {
    tree: &'a Tree234<K>,
    id: NodeId,
}

impl<K> Clone for Node234View<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Node234View<'_, K> {}

impl<'a, K> Node234View<'a, K> {
    fn node(&self) -> &'a Node234<K> {
        self.tree.nodes.get(self.id)
    }

    /// Id of the viewed node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's keys, in order.
    #[must_use]
    pub fn keys(&self) -> &'a [K] {
        &self.node().keys
    }

    /// Number of keys: 1, 2 or 3.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.node().keys.len()
    }

    /// Returns `true` if the node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node().is_leaf()
    }

    /// The node's children, left to right. Empty for a leaf.
    pub fn children(&self) -> impl ExactSizeIterator<Item = Self> + use<'a, K> {
        let tree = self.tree;
        self.node().children.iter().map(move |&id| Node234View { tree, id })
    }

    /// Parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.node().parent.map(|id| Node234View { tree: self.tree, id })
    }
}

impl<K: fmt::Debug> fmt::Debug for Node234View<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Node234View");
        debug.field("keys", &self.keys());
        if !self.is_leaf() {
            let children: Vec<_> = self.children().collect();
            debug.field("children", &children);
        }
        debug.finish()
    }
}

impl<K: Ord + Clone> SearchTree for Tree234<K> {
    type Key = K;
    type View<'a>
        = Node234View<'a, K>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> Result<InsertOutcome> {
        Ok(Tree234::insert(self, key))
    }

    fn search(&mut self, key: &K) -> Result<Option<NodeId>> {
        Ok(Tree234::search(self, key))
    }

    fn delete(&mut self, key: &K) -> Result<Removal> {
        Ok(Tree234::delete(self, key))
    }

    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn view(&self, id: NodeId) -> Option<Node234View<'_, K>> {
        Tree234::view(self, id)
    }

    fn len(&self) -> usize {
        self.len
    }

    fn clear(&mut self) {
        Tree234::clear(self);
    }
}

impl<K: fmt::Debug> fmt::Debug for Tree234<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl<K> Default for Tree234<K> {
    fn default() -> Self {
        Tree234::new()
    }
}

impl<K: Ord + Clone> FromIterator<K> for Tree234<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Tree234::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord + Clone> Extend<K> for Tree234<K> {
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

    /// Checks shape, ordering and parent links; returns the leaf depth.
    fn check(tree: &Tree234<i32>) -> usize {
        fn walk(tree: &Tree234<i32>, id: NodeId, parent: Option<NodeId>, depth: usize, leaf_depth: &mut Option<usize>) {
            let node = tree.nodes.get(id);
            assert_eq!(node.parent, parent);
            assert!((1..=3).contains(&node.keys.len()), "node {id:?} has {} keys", node.keys.len());
            assert!(!node.keys.spilled() && !node.children.spilled());
            if node.is_leaf() {
                let expected = *leaf_depth.get_or_insert(depth);
                assert_eq!(expected, depth, "leaves at different depths");
                return;
            }
            assert_eq!(node.children.len(), node.keys.len() + 1);
            for &child in &node.children {
                walk(tree, child, Some(id), depth + 1, leaf_depth);
            }
        }

        let mut leaf_depth = None;
        if let Some(root) = tree.root {
            walk(tree, root, None, 1, &mut leaf_depth);
        }
        let keys = tree.keys();
        assert_eq!(keys.len(), tree.len());
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        leaf_depth.unwrap_or(0)
    }

    #[test]
    fn root_split_grows_height() {
        let mut tree: Tree234<i32> = [10, 20, 30].into_iter().collect();
        assert_eq!(tree.height(), 1);
        tree.insert(40);
        assert_eq!(tree.height(), 2);
        assert_eq!(check(&tree), 2);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn delete_internal_key_uses_predecessor() {
        let mut tree: Tree234<i32> = (1..=10).collect();
        let root = tree.root().unwrap();
        let separator = tree.get(root).unwrap()[0];
        assert_eq!(tree.delete(&separator), Removal::Removed);
        check(&tree);
        assert!(!tree.contains(&separator));
        assert_eq!(tree.len(), 9);
    }

    #[test]
    fn borrow_then_merge_then_collapse() {
        // [20] over [10] and [30, 40]: deleting 10 borrows from the right.
        let mut tree: Tree234<i32> = [10, 20, 30, 40].into_iter().collect();
        tree.delete(&10);
        check(&tree);
        let root = tree.root_view().unwrap();
        assert_eq!(root.keys(), [30]);

        // [30] over [20] and [40]: deleting 20 merges and the root collapses.
        tree.delete(&20);
        check(&tree);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.root_view().unwrap().keys(), [30, 40]);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn duplicates_are_stored_and_removed_one_at_a_time() {
        let mut tree: Tree234<i32> = core::iter::repeat_n(7, 9).collect();
        check(&tree);
        assert_eq!(tree.len(), 9);
        for remaining in (0..9).rev() {
            assert_eq!(tree.delete(&7), Removal::Removed);
            assert_eq!(tree.len(), remaining);
            check(&tree);
        }
        assert_eq!(tree.delete(&7), Removal::NotFound);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.node_count(), 0);
    }
}

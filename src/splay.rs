//! A self-adjusting splay tree.

use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering::{Equal, Greater, Less};
use core::fmt;

use tracing::trace;

use crate::raw::{BinaryTree, Linked, Side};
use crate::tree::{InsertOutcome, Removal, SearchTree};
use crate::{NodeId, Result};

struct SplayNode<K> {
    key: K,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<K> Linked for SplayNode<K> {
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

/// A binary search tree that moves every node it touches to the root.
///
/// No balance information is stored. Instead each insert, search and delete
/// splays the node it reached to the root, which gives amortized O(log n) per
/// operation and makes repeated access to nearby keys cheap. A search that
/// misses still splays the last node it visited.
///
/// Keys are unique; a duplicate insert is a no-op.
///
/// # Examples
///
/// ```
/// use search_forest::SplayTree;
///
/// let mut tree = SplayTree::new();
/// tree.insert(5);
/// tree.insert(3);
/// assert_eq!(tree.root_view().map(|n| *n.key()), Some(3));
///
/// tree.search(&5);
/// assert_eq!(tree.root_view().map(|n| *n.key()), Some(5));
/// ```
pub struct SplayTree<K> {
    tree: BinaryTree<SplayNode<K>>,
}

impl<K> SplayTree<K> {
    /// Makes a new, empty `SplayTree`.
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

    /// Removes every key.
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
    pub fn view(&self, id: NodeId) -> Option<SplayView<'_, K>> {
        self.tree.nodes.try_get(id).map(|_| SplayView { tree: self, id })
    }

    /// Returns a read-only view of the root.
    #[must_use]
    pub fn root_view(&self) -> Option<SplayView<'_, K>> {
        self.tree.root.and_then(|id| self.view(id))
    }

    /// Returns the keys in ascending order without splaying anything.
    #[must_use]
    pub fn keys(&self) -> Vec<&K> {
        self.tree.in_order().into_iter().map(|id| &self.tree.nodes.get(id).key).collect()
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Rotates `node` up until it has no parent.
    fn splay(&mut self, node: NodeId) {
        while let Some(parent) = self.tree.parent(node) {
            let node_side = self.tree.side_of(node);
            match self.tree.parent(parent) {
                None => {
                    trace!(?node, "zig");
                    self.rotate_up(parent, node_side);
                }
                Some(grand) => {
                    let parent_side = self.tree.side_of(parent);
                    if node_side == parent_side {
                        trace!(?node, "zig-zig");
                        self.rotate_up(grand, parent_side);
                        self.rotate_up(parent, node_side);
                    } else {
                        trace!(?node, "zig-zag");
                        self.rotate_up(parent, node_side);
                        self.rotate_up(grand, parent_side);
                    }
                }
            }
        }
    }

    /// Lifts the child of `id` that sits on `side`.
    fn rotate_up(&mut self, id: NodeId, side: Option<Side>) {
        match side {
            Some(Side::Left) => self.tree.rotate_right(id),
            Some(Side::Right) => self.tree.rotate_left(id),
            None => {}
        }
    }
}

impl<K: Ord> SplayTree<K> {
    /// Walks towards `key`. Returns the matching node, or the last node visited
    /// and `None` on a miss.
    fn probe<Q>(&self, key: &Q) -> (Option<NodeId>, Option<NodeId>)
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let mut last = None;
        let mut current = self.tree.root;
        while let Some(id) = current {
            last = Some(id);
            current = match key.cmp(self.tree.nodes.get(id).key.borrow()) {
                Less => self.tree.left(id),
                Greater => self.tree.right(id),
                Equal => return (Some(id), last),
            };
        }
        (None, last)
    }

    /// Inserts `key` and splays it to the root.
    ///
    /// A duplicate leaves the tree untouched.
    ///
    /// # Complexity
    ///
    /// Amortized O(log n)
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

        let id = self.tree.nodes.alloc(SplayNode {
            key,
            parent: None,
            left: None,
            right: None,
        });
        match parent {
            Some(parent) => self.tree.set_child(parent, side, Some(id)),
            None => self.tree.root = Some(id),
        }
        self.splay(id);
        InsertOutcome::Inserted
    }

    /// Looks up `key` and splays what it found to the root.
    ///
    /// On a miss, the last node on the search path is splayed instead, so even
    /// failed lookups pull nearby keys up.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::SplayTree;
    ///
    /// let mut tree: SplayTree<_> = [10, 20, 30].into_iter().collect();
    /// assert!(tree.search(&25).is_none());
    /// // 20 or 30 was the last stop on the way to 25.
    /// let root = *tree.root_view().unwrap().key();
    /// assert!(root == 20 || root == 30);
    /// ```
    ///
    /// # Complexity
    ///
    /// Amortized O(log n)
    pub fn search<Q>(&mut self, key: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let (found, last) = self.probe(key);
        if let Some(last) = last {
            self.splay(last);
        }
        found
    }

    /// Removes `key`, joining its two subtrees under the largest key of the left one.
    ///
    /// # Examples
    ///
    /// ```
    /// use search_forest::{Removal, SplayTree};
    ///
    /// let mut tree: SplayTree<_> = [1, 2, 3, 4].into_iter().collect();
    /// assert_eq!(tree.delete(&3), Removal::Removed);
    /// assert_eq!(tree.root_view().map(|n| *n.key()), Some(2));
    /// assert_eq!(tree.keys(), [&1, &2, &4]);
    /// ```
    ///
    /// # Complexity
    ///
    /// Amortized O(log n)
    pub fn delete<Q>(&mut self, key: &Q) -> Removal
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(target) = SplayTree::search(self, key) else {
            return Removal::NotFound;
        };

        let left = self.tree.left(target);
        let right = self.tree.right(target);
        self.tree.nodes.free(target);
        self.tree.root = None;

        match (left, right) {
            (None, child) | (child, None) => {
                self.tree.root = child;
                if let Some(child) = child {
                    self.tree.nodes.get_mut(child).set_parent(None);
                }
            }
            (Some(left), Some(right)) => {
                self.tree.root = Some(left);
                self.tree.nodes.get_mut(left).set_parent(None);
                let max = self.tree.maximum(left);
                self.splay(max);
                self.tree.set_child(max, Side::Right, Some(right));
            }
        }
        Removal::Removed
    }
}

/// Read-only view of one splay node.
pub struct SplayView<'a, K> {
    tree: &'a SplayTree<K>,
    id: NodeId,
}

impl<K> Clone for SplayView<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for SplayView<'_, K> {}

impl<'a, K> SplayView<'a, K> {
    fn at(&self, id: Option<NodeId>) -> Option<Self> {
        id.map(|id| SplayView { tree: self.tree, id })
    }

    /// Id of the viewed node.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's key.
    #[must_use]
    pub fn key(&self) -> &'a K {
        &self.tree.tree.nodes.get(self.id).key
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
}

impl<K: fmt::Debug> fmt::Debug for SplayView<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplayView")
            .field("key", self.key())
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<K: Ord> SearchTree for SplayTree<K> {
    type Key = K;
    type View<'a>
        = SplayView<'a, K>
    where
        Self: 'a;

    fn insert(&mut self, key: K) -> Result<InsertOutcome> {
        Ok(SplayTree::insert(self, key))
    }

    fn search(&mut self, key: &K) -> Result<Option<NodeId>> {
        Ok(SplayTree::search(self, key))
    }

    fn delete(&mut self, key: &K) -> Result<Removal> {
        Ok(SplayTree::delete(self, key))
    }

    fn root(&self) -> Option<NodeId> {
        self.tree.root
    }

    fn view(&self, id: NodeId) -> Option<SplayView<'_, K>> {
        SplayTree::view(self, id)
    }

    fn len(&self) -> usize {
        self.tree.len()
    }

    fn clear(&mut self) {
        self.tree.clear();
    }
}

impl<K: fmt::Debug> fmt::Debug for SplayTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.keys()).finish()
    }
}

impl<K> Default for SplayTree<K> {
    fn default() -> Self {
        SplayTree::new()
    }
}

impl<K: Ord> FromIterator<K> for SplayTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = SplayTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for SplayTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

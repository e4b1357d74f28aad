//! The operation set shared by every engine.

use crate::{NodeId, Result};

/// Result of an insertion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum InsertOutcome {
    /// The key was stored.
    Inserted,
    /// An equal key was already present; nothing changed.
    Duplicate,
}

impl InsertOutcome {
    /// Returns `true` if the key was stored.
    #[must_use]
    pub const fn is_inserted(self) -> bool {
        matches!(self, InsertOutcome::Inserted)
    }
}

/// Result of a deletion.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Removal {
    /// One occurrence of the key was removed.
    Removed,
    /// The key was not present; nothing changed.
    NotFound,
}

impl Removal {
    /// Returns `true` if something was removed.
    #[must_use]
    pub const fn is_removed(self) -> bool {
        matches!(self, Removal::Removed)
    }
}

/// Insert/search/delete plus read-only views, implemented by all four engines.
///
/// Controllers that switch between engines at runtime program against this
/// trait (or hold an [`AnyTree`](crate::AnyTree)). Engine-specific queries,
/// such as [`KdTree::nearest`](crate::KdTree::nearest), stay inherent.
///
/// `search` takes `&mut self` because the splay tree restructures itself on
/// every lookup.
///
/// # Examples
///
/// ```
/// use search_forest::{RedBlackTree, SearchTree, SplayTree};
///
/// fn load<T: SearchTree<Key = i32>>(tree: &mut T) {
///     for key in [8, 3, 10] {
///         tree.insert(key).unwrap();
///     }
/// }
///
/// let mut a = RedBlackTree::new();
/// let mut b = SplayTree::new();
/// load(&mut a);
/// load(&mut b);
/// assert_eq!(SearchTree::len(&a), SearchTree::len(&b));
/// ```
pub trait SearchTree {
    /// What the tree is keyed by.
    type Key;
    /// Read-only handle on one node, for rendering and inspection.
    type View<'a>
    where
        Self: 'a;

    /// Stores `key`. Errors only on malformed input.
    fn insert(&mut self, key: Self::Key) -> Result<InsertOutcome>;

    /// Finds a node holding `key`.
    fn search(&mut self, key: &Self::Key) -> Result<Option<NodeId>>;

    /// Removes one occurrence of `key`.
    fn delete(&mut self, key: &Self::Key) -> Result<Removal>;

    /// The current root, if the tree is non-empty.
    fn root(&self) -> Option<NodeId>;

    /// Resolves `id` into a view; `None` if the id is stale.
    fn view(&self, id: NodeId) -> Option<Self::View<'_>>;

    /// View of the root node.
    fn root_view(&self) -> Option<Self::View<'_>> {
        self.root().and_then(|id| self.view(id))
    }

    /// Number of keys stored.
    fn len(&self) -> usize;

    /// Returns `true` if the tree holds no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every key. All previously issued ids go stale.
    fn clear(&mut self);
}

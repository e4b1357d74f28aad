use core::borrow::Borrow;

use smallvec::SmallVec;

use crate::NodeId;

pub(crate) const MAX_KEYS: usize = 3;
pub(crate) const MAX_CHILDREN: usize = MAX_KEYS + 1;

pub(crate) type Keys<K> = SmallVec<[K; MAX_KEYS]>;
pub(crate) type Children = SmallVec<[NodeId; MAX_CHILDREN]>;

// Inserts split full nodes on the way down and merges only ever combine
// 0 + 1 (+1 separator) keys, so neither vector ever spills to the heap.
pub(crate) struct Node234<K> {
    pub(crate) keys: Keys<K>,
    pub(crate) children: Children,
    pub(crate) parent: Option<NodeId>,
}

impl<K> Node234<K> {
    /// Creates a leaf holding a single key.
    pub(crate) fn leaf(key: K, parent: Option<NodeId>) -> Self {
        let mut keys = Keys::new();
        keys.push(key);
        Self {
            keys,
            children: Children::new(),
            parent,
        }
    }

    /// Creates a keyless node above `child`, to be filled by a split.
    pub(crate) fn above(child: NodeId) -> Self {
        let mut children = Children::new();
        children.push(child);
        Self {
            keys: Keys::new(),
            children,
            parent: None,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.keys.len() == MAX_KEYS
    }

    /// Returns true if this node can give a key to a sibling and keep one.
    pub(crate) fn can_lend(&self) -> bool {
        self.keys.len() > 1
    }
}

impl<K: Ord> Node234<K> {
    /// Index of the first key `>= key`: the key's slot if present, otherwise
    /// the child interval to descend into.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.keys.partition_point(|k| k.borrow() < key)
    }

    /// Index just past every key `<= key`; equal keys stay to the left.
    pub(crate) fn upper_bound(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }
}

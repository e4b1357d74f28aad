use crate::raw::Linked;
use crate::NodeId;

/// Color bit of a red-black node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    /// A red node never has a red child.
    Red,
    /// Black nodes are counted by the black height.
    Black,
}

pub(crate) struct RbNode<K> {
    pub(crate) key: K,
    pub(crate) color: Color,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
}

impl<K> RbNode<K> {
    /// New nodes start red.
    pub(crate) fn new(key: K) -> Self {
        Self {
            key,
            color: Color::Red,
            parent: None,
            left: None,
            right: None,
        }
    }
}

impl<K> Linked for RbNode<K> {
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

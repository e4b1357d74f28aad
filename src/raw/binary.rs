use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::NodeId;

/// Parent/left/right links of a binary node.
pub(crate) trait Linked {
    fn parent(&self) -> Option<NodeId>;
    fn left(&self) -> Option<NodeId>;
    fn right(&self) -> Option<NodeId>;
    fn set_parent(&mut self, id: Option<NodeId>);
    fn set_left(&mut self, id: Option<NodeId>);
    fn set_right(&mut self, id: Option<NodeId>);
}

/// Which child slot of a parent a node hangs from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Arena plus root: the shared skeleton of the binary engines.
pub(crate) struct BinaryTree<N> {
    pub(crate) nodes: Arena<N>,
    pub(crate) root: Option<NodeId>,
}

impl<N: Linked> BinaryTree<N> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).parent()
    }

    #[inline]
    pub(crate) fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).left()
    }

    #[inline]
    pub(crate) fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).right()
    }

    #[inline]
    pub(crate) fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        match side {
            Side::Left => self.left(id),
            Side::Right => self.right(id),
        }
    }

    pub(crate) fn set_child(&mut self, id: NodeId, side: Side, child: Option<NodeId>) {
        match side {
            Side::Left => self.nodes.get_mut(id).set_left(child),
            Side::Right => self.nodes.get_mut(id).set_right(child),
        }
        if let Some(child) = child {
            self.nodes.get_mut(child).set_parent(Some(id));
        }
    }

    /// Which side of its parent `id` sits on, or `None` for the root.
    pub(crate) fn side_of(&self, id: NodeId) -> Option<Side> {
        let parent = self.parent(id)?;
        if self.left(parent) == Some(id) {
            Some(Side::Left)
        } else {
            Some(Side::Right)
        }
    }

    /// Points whatever referenced `old` (a parent slot or the root) at `new`.
    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.nodes.get_mut(parent);
                if node.left() == Some(old) {
                    node.set_left(new);
                } else {
                    node.set_right(new);
                }
            }
        }
    }

    /// Replaces the subtree rooted at `old` with the one rooted at `new`.
    /// `old` keeps its own links; the caller decides what to do with it.
    pub(crate) fn transplant(&mut self, old: NodeId, new: Option<NodeId>) {
        let parent = self.parent(old);
        self.replace_child(parent, old, new);
        if let Some(new) = new {
            self.nodes.get_mut(new).set_parent(parent);
        }
    }

    /// ```text
    ///   x              y
    ///  / \            / \
    /// a   y    →     x   c
    ///    / \        / \
    ///   b   c      a   b
    /// ```
    pub(crate) fn rotate_left(&mut self, x: NodeId) {
        let y = self.right(x).expect("`BinaryTree::rotate_left()` - node has no right child!");
        let b = self.left(y);
        self.nodes.get_mut(x).set_right(b);
        if let Some(b) = b {
            self.nodes.get_mut(b).set_parent(Some(x));
        }
        self.transplant(x, Some(y));
        self.nodes.get_mut(y).set_left(Some(x));
        self.nodes.get_mut(x).set_parent(Some(y));
    }

    /// Mirror image of [`rotate_left`](Self::rotate_left).
    pub(crate) fn rotate_right(&mut self, x: NodeId) {
        let y = self.left(x).expect("`BinaryTree::rotate_right()` - node has no left child!");
        let b = self.right(y);
        self.nodes.get_mut(x).set_left(b);
        if let Some(b) = b {
            self.nodes.get_mut(b).set_parent(Some(x));
        }
        self.transplant(x, Some(y));
        self.nodes.get_mut(y).set_right(Some(x));
        self.nodes.get_mut(x).set_parent(Some(y));
    }

    /// Rotates `x` down towards `direction`; its other child takes its place.
    pub(crate) fn rotate(&mut self, x: NodeId, direction: Side) {
        match direction {
            Side::Left => self.rotate_left(x),
            Side::Right => self.rotate_right(x),
        }
    }

    pub(crate) fn minimum(&self, mut id: NodeId) -> NodeId {
        while let Some(left) = self.left(id) {
            id = left;
        }
        id
    }

    pub(crate) fn maximum(&self, mut id: NodeId) -> NodeId {
        while let Some(right) = self.right(id) {
            id = right;
        }
        id
    }

    /// Distance from `id` up to the root.
    pub(crate) fn depth(&self, mut id: NodeId) -> usize {
        let mut depth = 0;
        while let Some(parent) = self.parent(id) {
            depth += 1;
            id = parent;
        }
        depth
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((id, level)) = stack.pop() {
            height = height.max(level);
            stack.extend(self.left(id).map(|left| (left, level + 1)));
            stack.extend(self.right(id).map(|right| (right, level + 1)));
        }
        height
    }

    /// Node ids in key order.
    pub(crate) fn in_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack = Vec::new();
        let mut current = self.root;
        loop {
            while let Some(id) = current {
                stack.push(id);
                current = self.left(id);
            }
            let Some(id) = stack.pop() else { break };
            out.push(id);
            current = self.right(id);
        }
        out
    }

    /// Node ids parent-before-children, left subtree first.
    pub(crate) fn pre_order(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.right(id));
            stack.extend(self.left(id));
        }
        out
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    struct Plain {
        key: i32,
        parent: Option<NodeId>,
        left: Option<NodeId>,
        right: Option<NodeId>,
    }

    impl Linked for Plain {
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

    fn plain(key: i32) -> Plain {
        Plain {
            key,
            parent: None,
            left: None,
            right: None,
        }
    }

    fn keys(tree: &BinaryTree<Plain>) -> Vec<i32> {
        tree.in_order().into_iter().map(|id| tree.nodes.get(id).key).collect()
    }

    /// Builds `2(1, 4(3, 5))`.
    fn sample() -> (BinaryTree<Plain>, [NodeId; 5]) {
        let mut tree = BinaryTree::new();
        let ids = [1, 2, 3, 4, 5].map(|k| tree.nodes.alloc(plain(k)));
        let [n1, n2, n3, n4, n5] = ids;
        tree.root = Some(n2);
        tree.set_child(n2, Side::Left, Some(n1));
        tree.set_child(n2, Side::Right, Some(n4));
        tree.set_child(n4, Side::Left, Some(n3));
        tree.set_child(n4, Side::Right, Some(n5));
        (tree, ids)
    }

    #[test]
    fn rotations_keep_order_and_links() {
        let (mut tree, [n1, n2, n3, n4, n5]) = sample();

        tree.rotate_left(n2);
        assert_eq!(tree.root, Some(n4));
        assert_eq!(tree.parent(n4), None);
        assert_eq!(tree.left(n4), Some(n2));
        assert_eq!(tree.right(n2), Some(n3));
        assert_eq!(tree.parent(n3), Some(n2));
        assert_eq!(keys(&tree), [1, 2, 3, 4, 5]);

        tree.rotate_right(n4);
        assert_eq!(tree.root, Some(n2));
        assert_eq!(tree.left(n2), Some(n1));
        assert_eq!(tree.right(n2), Some(n4));
        assert_eq!(tree.left(n4), Some(n3));
        assert_eq!(tree.right(n4), Some(n5));
        assert_eq!(keys(&tree), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn transplant_and_shape_queries() {
        let (mut tree, [n1, n2, n3, n4, n5]) = sample();
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.depth(n5), 2);
        assert_eq!(tree.side_of(n3), Some(Side::Left));
        assert_eq!(tree.side_of(n2), None);
        assert_eq!(tree.minimum(n2), n1);
        assert_eq!(tree.maximum(n2), n5);

        tree.transplant(n4, Some(n5));
        tree.nodes.get_mut(n5).set_left(None);
        assert_eq!(tree.right(n2), Some(n5));
        assert_eq!(tree.parent(n5), Some(n2));

        let pre: Vec<i32> = tree.pre_order().into_iter().map(|id| tree.nodes.get(id).key).collect();
        assert_eq!(pre, [2, 1, 5]);
    }
}

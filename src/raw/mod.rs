mod arena;
mod binary;
mod handle;

pub(crate) use arena::Arena;
pub(crate) use binary::{BinaryTree, Linked, Side};
pub use handle::NodeId;

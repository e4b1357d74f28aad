use core::fmt;
use core::num::NonZero;

type RawIndex = u32;

/// Identifies one node inside one tree's arena.
///
/// A `NodeId` pairs a slot index with the generation the slot had when the
/// node was allocated. Once the node is freed the slot's generation moves on,
/// so an id held across a mutating call resolves to `None` instead of to
/// whatever node reused the slot.
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
pub struct NodeId {
    // Stored as `index + 1` so `Option<NodeId>` costs nothing extra.
    index: NonZero<RawIndex>,
    generation: u32,
}

impl NodeId {
    pub(crate) const MAX: usize = (RawIndex::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn new(index: usize, generation: u32) -> Self {
        assert!(index <= Self::MAX, "`NodeId::new()` - `index` > `NodeId::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawIndex;
        match NonZero::new(raw) {
            Some(index) => Self { index, generation },
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        (self.index.get() - 1) as usize
    }

    #[inline]
    pub(crate) const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index(), self.generation)
    }
}

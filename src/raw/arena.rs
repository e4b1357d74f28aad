use alloc::vec::Vec;

use super::handle::NodeId;

struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

impl<T> Slot<T> {
    /// Moves to the next generation. Returns `false` once the generations are
    /// used up, in which case the slot must never be handed out again.
    fn advance(&mut self) -> bool {
        match self.generation.checked_add(1) {
            Some(next) => {
                self.generation = next;
                true
            }
            None => false,
        }
    }
}

/// Slot storage for the nodes of one tree.
///
/// Freed slots are recycled; every free bumps the slot's generation so ids
/// issued before the free no longer resolve. A slot whose generation would
/// wrap is retired instead, so a stale id can never match again.
pub(crate) struct Arena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    retired: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            retired: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len() - self.retired
    }

    pub(crate) fn alloc(&mut self, element: T) -> NodeId {
        if let Some(index) = self.free.pop() {
            // Reuse a free slot under its current generation.
            let slot = &mut self.slots[index];
            slot.value = Some(element);
            NodeId::new(index, slot.generation)
        } else {
            assert!(
                self.slots.len() <= NodeId::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                NodeId::MAX
            );
            self.slots.push(Slot {
                generation: 0,
                value: Some(element),
            });
            NodeId::new(self.slots.len() - 1, 0)
        }
    }

    /// Resolves `id`, returning `None` if it is stale or foreign.
    #[inline]
    pub(crate) fn try_get(&self, id: NodeId) -> Option<&T> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_ref())
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &T {
        self.try_get(id).expect("`Arena::get()` - `id` is invalid!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut T {
        self.slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.value.as_mut())
            .expect("`Arena::get_mut()` - `id` is invalid!")
    }

    pub(crate) fn take(&mut self, id: NodeId) -> T {
        let slot = self
            .slots
            .get_mut(id.index())
            .filter(|slot| slot.generation == id.generation())
            .expect("`Arena::take()` - `id` is invalid!");
        let element = slot.value.take().expect("`Arena::take()` - `id` is invalid!");
        if slot.advance() {
            self.free.push(id.index());
        } else {
            self.retired += 1;
        }
        element
    }

    pub(crate) fn free(&mut self, id: NodeId) {
        drop(self.take(id));
    }

    /// Drops every element. Generations survive so old ids stay dead.
    pub(crate) fn clear(&mut self) {
        self.free.clear();
        self.retired = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let reusable = if slot.value.take().is_some() {
                slot.advance()
            } else {
                // Free slots never sit at `u32::MAX`; only retired ones do.
                slot.generation != u32::MAX
            };
            if reusable {
                self.free.push(index);
            } else {
                self.retired += 1;
            }
        }
        // Hand out low indices first after a clear.
        self.free.reverse();
    }
}

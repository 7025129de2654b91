use rustc_hash::FxHashSet;

use crate::{MemoryError, SlotId};

/// Fixed-size slots. Freed slots are reused before new ones are created.
#[derive(Debug)]
pub struct Pool {
    slot_size: usize,
    slots: u32,
    free: Vec<SlotId>,
    used: FxHashSet<SlotId>,
}

impl Pool {
    pub fn new(slot_size: usize) -> Self {
        Pool {
            slot_size,
            slots: 0,
            free: Vec::new(),
            used: FxHashSet::default(),
        }
    }

    pub fn allocate(&mut self) -> SlotId {
        let slot = self.free.pop().unwrap_or_else(|| {
            let slot = SlotId::new(self.slots);
            self.slots += 1;
            slot
        });
        self.used.insert(slot);
        slot
    }

    pub fn free(&mut self, slot: SlotId) -> Result<(), MemoryError> {
        if slot.raw() >= self.slots {
            return Err(MemoryError::UnknownSlot(slot));
        }
        if !self.used.remove(&slot) {
            return Err(MemoryError::DoubleFree(slot));
        }
        self.free.push(slot);
        Ok(())
    }

    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Slots created so far, in use or not.
    pub fn capacity(&self) -> usize {
        self.slots as usize
    }

    pub fn in_use(&self) -> usize {
        self.used.len()
    }
}

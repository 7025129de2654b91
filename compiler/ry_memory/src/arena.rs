use rustc_hash::FxHashMap;

use crate::{ArenaId, MemoryError};

/// Arenas hand out blocks that are only ever released together.
#[derive(Debug, Default)]
pub struct Arenas {
    arenas: FxHashMap<ArenaId, Vec<usize>>,
    next: u32,
}

impl Arenas {
    pub fn create(&mut self) -> ArenaId {
        let id = ArenaId::new(self.next);
        self.next += 1;
        self.arenas.insert(id, Vec::new());
        id
    }

    /// Allocate `size` bytes in `arena`, returning the block's offset.
    pub fn allocate(&mut self, arena: ArenaId, size: usize) -> Result<usize, MemoryError> {
        let blocks = self
            .arenas
            .get_mut(&arena)
            .ok_or(MemoryError::UnknownArena(arena))?;
        let offset = blocks.iter().sum();
        blocks.push(size);
        Ok(offset)
    }

    /// Release every block of `arena` at once, returning the bytes freed.
    pub fn free(&mut self, arena: ArenaId) -> Result<usize, MemoryError> {
        let blocks = self
            .arenas
            .remove(&arena)
            .ok_or(MemoryError::UnknownArena(arena))?;
        Ok(blocks.iter().sum())
    }

    pub fn used_bytes(&self) -> usize {
        self.arenas.values().flatten().sum()
    }

    pub fn len(&self) -> usize {
        self.arenas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arenas.is_empty()
    }
}
